use crate::models::Role;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate widget id `{0}`")]
    DuplicateId(String),

    #[error("widget `{0}` declares no roles")]
    EmptyRoles(String),

    #[error("widget `{0}` has no relevance score function")]
    MissingScore(String),

    #[error("widget `{id}` config for role `{role}` is not a JSON object")]
    ConfigNotObject {
        id: String,
        role: Role,
    },

    #[error("widget with name `{0}` has an empty id")]
    EmptyId(String),

    /// A predicate or score function panicked during catalog validation
    #[error("widget `{id}` {function} failed during validation: {message}")]
    ProbeFailed {
        id: String,
        /// Which function (`show_if`, `hide_if`, `relevance_score`)
        function: &'static str,
        message: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("{connected} integrations connected but only {total} exist")]
    IntegrationsExceedTotal { connected: u32, total: u32 },

    #[error("velocity variance must be finite, got {0}")]
    NonFiniteVariance(f64),
}
