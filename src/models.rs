use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

pub type WidgetConfig = serde_json::Map<String, serde_json::Value>;

pub type MessageContext = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Contributor,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Contributor, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Contributor => "contributor",
            Role::User => "user",
        }
    }

    /// Parses a role name as handed over by the auth layer. Unknown names yield `None`
    /// so callers pick their own fallback.
    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "admin" => Some(Role::Admin),
            "contributor" => Some(Role::Contributor),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Role::Admin => 0,
            Role::Contributor => 1,
            Role::User => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_name(s).ok_or_else(|| format!("unknown role `{s}`"))
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self::of(&Role::ALL)
    }

    pub fn of(roles: &[Role]) -> Self {
        let mut set = Self::empty();
        for role in roles {
            set.insert(*role);
        }
        set
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= 1 << role.index();
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & (1 << role.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|role| self.contains(*role))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleMap<T> {
    slots: [Option<T>; 3],
}

impl<T> RoleMap<T> {
    pub fn new() -> Self {
        Self {
            slots: [None, None, None],
        }
    }

    pub fn set(&mut self, role: Role, value: T) {
        self.slots[role.index()] = Some(value);
    }

    pub fn get(&self, role: Role) -> Option<&T> {
        self.slots[role.index()].as_ref()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.slots[role.index()].is_some()
    }
}

impl<T> Default for RoleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Built fresh by the caller for every evaluation; the engine never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SituationProfile {
    pub active_sprint: bool,
    pub sprint_day: u32,
    pub blockers_count: u32,
    pub risks_count: u32,
    pub wip_high: bool,
    pub velocity_unstable: bool,
    pub velocity_variance: f64,
    pub trend_negative: bool,
    pub analysis_count: u32,
    pub recommendations_count: u32,
    pub quick_wins_count: u32,
    pub urgent_actions_count: u32,
    pub patterns_detected: u32,
    pub critical_patterns: u32,
    pub high_patterns: u32,
    pub integrations_connected: u32,
    pub integrations_total: u32,
    pub data_collected: u32,
}

impl SituationProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.integrations_connected > self.integrations_total {
            return Err(ProfileError::IntegrationsExceedTotal {
                connected: self.integrations_connected,
                total: self.integrations_total,
            });
        }
        if !self.velocity_variance.is_finite() {
            return Err(ProfileError::NonFiniteVariance(self.velocity_variance));
        }
        Ok(())
    }

    pub fn integrations_pending(&self) -> u32 {
        self.integrations_total
            .saturating_sub(self.integrations_connected)
    }

    pub fn context(&self) -> MessageContext {
        let mut context = MessageContext::new();
        let mut put = |name: &str, value: String| {
            context.insert(name.to_string(), value);
        };

        put("activeSprint", self.active_sprint.to_string());
        put("sprintDay", self.sprint_day.to_string());
        put("blockersCount", self.blockers_count.to_string());
        put("risksCount", self.risks_count.to_string());
        put("wipHigh", self.wip_high.to_string());
        put("velocityUnstable", self.velocity_unstable.to_string());
        put("velocityVariance", format!("{:.1}", self.velocity_variance));
        put("trendNegative", self.trend_negative.to_string());
        put("analysisCount", self.analysis_count.to_string());
        put("recommendationsCount", self.recommendations_count.to_string());
        put("quickWinsCount", self.quick_wins_count.to_string());
        put("urgentActionsCount", self.urgent_actions_count.to_string());
        put("patternsDetected", self.patterns_detected.to_string());
        put("criticalPatterns", self.critical_patterns.to_string());
        put("highPatterns", self.high_patterns.to_string());
        put("integrationsConnected", self.integrations_connected.to_string());
        put("integrationsTotal", self.integrations_total.to_string());
        put("integrationsPending", self.integrations_pending().to_string());
        put("dataCollected", self.data_collected.to_string());

        context
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub id: String,
    pub relevance: f64,
    pub priority: i32,
    pub config: WidgetConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedRecommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub prefix: String,
    pub show_details: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamProfile {
    pub team: String,
    pub profile: SituationProfile,
}

#[derive(Debug, Clone)]
pub struct WidgetSummary {
    pub id: String,
    pub count: usize,
    pub avg_relevance: f64,
}
