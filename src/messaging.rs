use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::{MessageContext, Role};

// Literal pattern; compiled in a unit test.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

static BUILTIN: Lazy<MessageBook> = Lazy::new(MessageBook::builtin);

/// (key, admin, contributor, user)
const BUILTIN_MESSAGES: &[(&str, Option<&str>, &str, Option<&str>)] = &[
    (
        "teamOverview",
        Some("Workspace overview"),
        "Team overview",
        Some("Your team at a glance"),
    ),
    (
        "sprintHealth",
        Some("Sprint day {sprintDay}: velocity variance {velocityVariance}%"),
        "Sprint day {sprintDay}: how the sprint is tracking",
        Some("How the current sprint is going"),
    ),
    (
        "totalBlockers",
        Some("Total blockers: {blockersCount}"),
        "Blockers needing attention: {blockersCount}",
        Some("Things slowing the team down: {blockersCount}"),
    ),
    (
        "activeRisks",
        Some("Open risks: {risksCount}"),
        "Risks to watch: {risksCount}",
        Some("Things to keep an eye on: {risksCount}"),
    ),
    (
        "wipHigh",
        Some("WIP above limit, {blockersCount} items blocked"),
        "Too much work in progress, finish before starting new items",
        Some("The team is juggling a lot right now"),
    ),
    (
        "velocityTrend",
        Some("Velocity variance {velocityVariance}% across {analysisCount} analyses"),
        "Velocity is shifting between sprints",
        Some("How much the team gets done each sprint"),
    ),
    (
        "urgentActions",
        Some("{urgentActionsCount} urgent actions pending"),
        "{urgentActionsCount} actions need you soon",
        Some("{urgentActionsCount} things worth doing soon"),
    ),
    (
        "recommendations",
        Some("{recommendationsCount} recommendations generated"),
        "{recommendationsCount} suggested improvements",
        Some("{recommendationsCount} ideas to help the team"),
    ),
    (
        "quickWins",
        Some("{quickWinsCount} quick wins identified"),
        "{quickWinsCount} quick wins you can pick up",
        Some("{quickWinsCount} easy improvements"),
    ),
    (
        "patternsDetected",
        Some("{patternsDetected} patterns detected ({criticalPatterns} critical, {highPatterns} high)"),
        "{patternsDetected} recurring patterns in your workflow",
        None,
    ),
    (
        "analysisHistory",
        Some("{analysisCount} analyses on record"),
        "{analysisCount} past analyses",
        None,
    ),
    (
        "integrationsPending",
        Some("{integrationsConnected}/{integrationsTotal} integrations connected"),
        "{integrationsPending} integrations still to connect",
        Some("Connect your tools to get better insights"),
    ),
    (
        "dataCollecting",
        Some("{dataCollected} days of history collected"),
        "Collecting data: {dataCollected} days so far",
        Some("We're still learning how your team works"),
    ),
    (
        "noActivations",
        Some("No widgets match the current situation"),
        "Nothing needs your attention right now",
        Some("All quiet, nothing to show yet"),
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageVariants {
    contributor: String,
    admin: Option<String>,
    user: Option<String>,
}

impl MessageVariants {
    pub fn new(contributor: impl Into<String>) -> Self {
        Self {
            contributor: contributor.into(),
            admin: None,
            user: None,
        }
    }

    #[must_use]
    pub fn with_admin(mut self, text: impl Into<String>) -> Self {
        self.admin = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_user(mut self, text: impl Into<String>) -> Self {
        self.user = Some(text.into());
        self
    }

    pub fn for_role(&self, role: Role) -> &str {
        let specific = match role {
            Role::Admin => self.admin.as_deref(),
            Role::Contributor => None,
            Role::User => self.user.as_deref(),
        };
        specific.unwrap_or(&self.contributor)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageBook {
    entries: HashMap<String, MessageVariants>,
}

impl MessageBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut book = Self::new();
        for (key, admin, contributor, user) in BUILTIN_MESSAGES {
            let mut variants = MessageVariants::new(*contributor);
            if let Some(text) = admin {
                variants = variants.with_admin(*text);
            }
            if let Some(text) = user {
                variants = variants.with_user(*text);
            }
            book.insert(*key, variants);
        }
        book
    }

    /// Adds or replaces a key. Returns the previous wordings, if any.
    pub fn insert(&mut self, key: impl Into<String>, variants: MessageVariants) -> Option<MessageVariants> {
        self.entries.insert(key.into(), variants)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn adapt(&self, key: &str, role: Role, context: &MessageContext) -> String {
        match self.entries.get(key) {
            Some(variants) => fill_placeholders(variants.for_role(role), context),
            None => key.to_string(),
        }
    }
}

pub fn builtin_book() -> &'static MessageBook {
    &BUILTIN
}

pub fn adapt_message(key: &str, role: Role, context: &MessageContext) -> String {
    BUILTIN.adapt(key, role, context)
}

/// Like [`adapt_message`] for a role name straight from the auth layer. Unknown names
/// get the contributor wording.
pub fn adapt_message_for(key: &str, role_name: &str, context: &MessageContext) -> String {
    adapt_message(key, Role::from_name(role_name).unwrap_or(Role::Contributor), context)
}

/// Replaces each `{name}` with its context value. Placeholders without a value are left
/// in place so they show up in the rendered text.
pub fn fill_placeholders(template: &str, context: &MessageContext) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match context.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
