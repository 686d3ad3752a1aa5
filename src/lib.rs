//! Adaptive dashboard composition.
//!
//! Given a [`SituationProfile`] and a viewer [`Role`], the relevance engine decides which
//! widgets appear and in what order, and the messaging layer phrases their text in a
//! tone that suits the role.

pub mod catalog;
pub mod compose;
pub mod error;
pub mod input;
pub mod messaging;
pub mod models;
pub mod relevance;
pub mod report;
pub mod tone;
pub mod widgets;

pub use catalog::{Catalog, SharedCatalog, WidgetDescriptor};
pub use compose::{compose_dashboard, Dashboard, Panel};
pub use error::{CatalogError, ProfileError};
pub use messaging::{adapt_message, adapt_message_for, MessageBook, MessageVariants};
pub use models::{
    Activation, FormattedRecommendation, MessageContext, Priority, RecommendationItem, Role,
    RoleMap, RoleSet, SituationProfile, WidgetConfig,
};
pub use relevance::select_activations;
pub use tone::{
    constructive_rewrite, format_recommendation, format_recommendation_for, role_tone,
    role_tone_for, ToneDescriptor,
};
