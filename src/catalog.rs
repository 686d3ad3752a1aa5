use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::models::{Role, RoleMap, RoleSet, SituationProfile, WidgetConfig};

type Predicate = Box<dyn Fn(&SituationProfile) -> bool + Send + Sync>;
type Scorer = Box<dyn Fn(&SituationProfile) -> f64 + Send + Sync>;

// Every predicate and score must survive both before a catalog is accepted.
static PROBE_PROFILES: Lazy<[SituationProfile; 2]> = Lazy::new(|| {
    [
        SituationProfile::default(),
        SituationProfile {
            active_sprint: true,
            sprint_day: 9,
            blockers_count: 12,
            risks_count: 8,
            wip_high: true,
            velocity_unstable: true,
            velocity_variance: 42.5,
            trend_negative: true,
            analysis_count: 30,
            recommendations_count: 15,
            quick_wins_count: 6,
            urgent_actions_count: 4,
            patterns_detected: 10,
            critical_patterns: 3,
            high_patterns: 5,
            integrations_connected: 2,
            integrations_total: 6,
            data_collected: 120,
        },
    ]
});

pub struct WidgetDescriptor {
    id: String,
    name: String,
    category: String,
    priority: i32,
    show_if: Option<Predicate>,
    hide_if: Option<Predicate>,
    relevance_score: Option<Scorer>,
    roles: RoleSet,
    config: RoleMap<Value>,
    headline: Option<String>,
}

impl WidgetDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            priority: 0,
            show_if: None,
            hide_if: None,
            relevance_score: None,
            roles: RoleSet::empty(),
            config: RoleMap::new(),
            headline: None,
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn roles(mut self, roles: &[Role]) -> Self {
        self.roles = RoleSet::of(roles);
        self
    }

    #[must_use]
    pub fn show_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SituationProfile) -> bool + Send + Sync + 'static,
    {
        self.show_if = Some(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn hide_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SituationProfile) -> bool + Send + Sync + 'static,
    {
        self.hide_if = Some(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn score<F>(mut self, scorer: F) -> Self
    where
        F: Fn(&SituationProfile) -> f64 + Send + Sync + 'static,
    {
        self.relevance_score = Some(Box::new(scorer));
        self
    }

    /// Per-role settings. Must be a JSON object; anything else is rejected when the
    /// catalog is built.
    #[must_use]
    pub fn config(mut self, role: Role, config: Value) -> Self {
        self.config.set(role, config);
        self
    }

    #[must_use]
    pub fn headline(mut self, key: impl Into<String>) -> Self {
        self.headline = Some(key.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn priority_weight(&self) -> i32 {
        self.priority
    }

    pub fn allowed_roles(&self) -> RoleSet {
        self.roles
    }

    pub fn headline_key(&self) -> Option<&str> {
        self.headline.as_deref()
    }

    pub fn config_for(&self, role: Role) -> WidgetConfig {
        self.config
            .get(role)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn is_hidden(&self, profile: &SituationProfile) -> bool {
        self.hide_if.as_ref().is_some_and(|hide| hide(profile))
    }

    pub(crate) fn is_shown(&self, profile: &SituationProfile) -> bool {
        self.show_if.as_ref().map_or(true, |show| show(profile))
    }

    pub(crate) fn raw_score(&self, profile: &SituationProfile) -> f64 {
        self.relevance_score.as_ref().map_or(0.0, |score| score(profile))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::EmptyId(self.name.clone()));
        }
        if self.roles.is_empty() {
            return Err(CatalogError::EmptyRoles(self.id.clone()));
        }
        if self.relevance_score.is_none() {
            return Err(CatalogError::MissingScore(self.id.clone()));
        }
        for role in Role::ALL {
            match self.config.get(role) {
                Some(Value::Object(_)) => {}
                Some(_) => return Err(CatalogError::ConfigNotObject {
                    id: self.id.clone(),
                    role,
                }),
                None if self.roles.contains(role) => {
                    warn!(widget = %self.id, %role, "no config for declared role, using empty config");
                }
                None => {}
            }
        }

        for profile in PROBE_PROFILES.iter() {
            self.probe("hide_if", || self.is_hidden(profile))?;
            self.probe("show_if", || self.is_shown(profile))?;
            self.probe("relevance_score", || self.raw_score(profile))?;
        }
        Ok(())
    }

    fn probe<T>(&self, function: &'static str, call: impl FnOnce() -> T) -> Result<T, CatalogError> {
        panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| CatalogError::ProbeFailed {
            id: self.id.clone(),
            function,
            message: panic_message(payload.as_ref()),
        })
    }
}

impl std::fmt::Debug for WidgetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .field("roles", &self.roles)
            .field("show_if", &self.show_if.is_some())
            .field("hide_if", &self.hide_if.is_some())
            .field("headline", &self.headline)
            .finish()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    widgets: Vec<Arc<WidgetDescriptor>>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Validates every descriptor and builds the catalog. Any error here means the
    /// catalog must not serve evaluations.
    pub fn new(descriptors: Vec<WidgetDescriptor>) -> Result<Self, CatalogError> {
        for descriptor in &descriptors {
            descriptor.validate()?;
        }
        let catalog = Self::from_shared(descriptors.into_iter().map(Arc::new).collect())?;
        info!(widgets = catalog.len(), "widget catalog loaded");
        Ok(catalog)
    }

    fn from_shared(widgets: Vec<Arc<WidgetDescriptor>>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(widgets.len());
        for (position, widget) in widgets.iter().enumerate() {
            if index.insert(widget.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(widget.id.clone()));
            }
        }
        Ok(Self { widgets, index })
    }

    pub fn with_widget(&self, descriptor: WidgetDescriptor) -> Result<Self, CatalogError> {
        if self.index.contains_key(&descriptor.id) {
            return Err(CatalogError::DuplicateId(descriptor.id));
        }
        descriptor.validate()?;
        let mut widgets = self.widgets.clone();
        widgets.push(Arc::new(descriptor));
        Self::from_shared(widgets)
    }

    pub fn get(&self, id: &str) -> Option<&WidgetDescriptor> {
        self.index.get(id).map(|position| self.widgets[*position].as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetDescriptor> {
        self.widgets.iter().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

#[derive(Debug)]
pub struct SharedCatalog {
    current: RwLock<Arc<Catalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.current.read())
    }

    pub fn register(&self, descriptor: WidgetDescriptor) -> Result<(), CatalogError> {
        let mut current = self.current.write();
        let id = descriptor.id.clone();
        let next = current.with_widget(descriptor)?;
        *current = Arc::new(next);
        info!(widget = %id, widgets = current.len(), "widget registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget(id: &str) -> WidgetDescriptor {
        WidgetDescriptor::new(id, id, "test")
            .roles(&[Role::Admin])
            .config(Role::Admin, json!({}))
            .score(|_| 10.0)
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Catalog::new(vec![widget("a"), widget("b"), widget("a")]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn rejects_empty_roles() {
        let descriptor = WidgetDescriptor::new("lonely", "Lonely", "test").score(|_| 1.0);
        let err = Catalog::new(vec![descriptor]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyRoles(id) if id == "lonely"));
    }

    #[test]
    fn rejects_missing_score() {
        let descriptor = WidgetDescriptor::new("mute", "Mute", "test").roles(&[Role::User]);
        assert!(matches!(
            Catalog::new(vec![descriptor]),
            Err(CatalogError::MissingScore(_))
        ));
    }

    #[test]
    fn rejects_non_object_config() {
        let descriptor = widget("odd").config(Role::Admin, json!([1, 2]));
        assert!(matches!(
            Catalog::new(vec![descriptor]),
            Err(CatalogError::ConfigNotObject { role: Role::Admin, .. })
        ));
    }

    #[test]
    fn rejects_score_that_panics_during_validation() {
        let descriptor = widget("boom").score(|p| {
            if p.blockers_count > 10 {
                panic!("score exploded");
            }
            1.0
        });
        match Catalog::new(vec![descriptor]) {
            Err(CatalogError::ProbeFailed { id, function, message }) => {
                assert_eq!(id, "boom");
                assert_eq!(function, "relevance_score");
                assert_eq!(message, "score exploded");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn rejects_hide_if_that_panics_on_busy_profile() {
        let descriptor = widget("jumpy").hide_if(|p| {
            if p.blockers_count > 10 {
                panic!("too many blockers");
            }
            false
        });
        match Catalog::new(vec![descriptor]) {
            Err(CatalogError::ProbeFailed { id, function, .. }) => {
                assert_eq!(id, "jumpy");
                assert_eq!(function, "hide_if");
            }
            other => panic!("expected hide_if failure, got {other:?}"),
        }
    }

    #[test]
    fn rejects_show_if_that_always_panics() {
        let descriptor = widget("broken").show_if(|_| panic!("{}", String::from("no rule")));
        match Catalog::new(vec![descriptor]) {
            Err(CatalogError::ProbeFailed { function, message, .. }) => {
                assert_eq!(function, "show_if");
                assert_eq!(message, "no rule");
            }
            other => panic!("expected show_if failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_config_falls_back_to_empty_object() {
        let descriptor = WidgetDescriptor::new("bare", "Bare", "test")
            .roles(&[Role::User])
            .score(|_| 5.0);
        let catalog = Catalog::new(vec![descriptor]).unwrap();
        let bare = catalog.get("bare").unwrap();
        assert!(bare.config_for(Role::User).is_empty());
    }

    #[test]
    fn keeps_declaration_order() {
        let catalog = Catalog::new(vec![widget("c"), widget("a"), widget("b")]).unwrap();
        let ids: Vec<&str> = catalog.iter().map(WidgetDescriptor::id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn shared_catalog_registration_swaps_snapshot() {
        let shared = SharedCatalog::new(Catalog::new(vec![widget("a")]).unwrap());
        let before = shared.snapshot();

        shared.register(widget("b")).unwrap();
        assert!(shared.register(widget("a")).is_err());

        assert_eq!(before.len(), 1);
        assert_eq!(shared.snapshot().len(), 2);
        assert!(shared.snapshot().get("b").is_some());
    }

    #[test]
    fn readers_see_whole_catalogs_while_registering() {
        let shared = SharedCatalog::new(Catalog::new(vec![widget("base")]).unwrap());

        std::thread::scope(|scope| {
            let reader = scope.spawn(|| {
                for _ in 0..200 {
                    let snapshot = shared.snapshot();
                    let activations = crate::relevance::select_activations(
                        &snapshot,
                        &SituationProfile::default(),
                        Role::Admin,
                    );
                    assert_eq!(activations.len(), snapshot.len());
                }
            });
            for n in 0..20 {
                shared.register(widget(&format!("w{n}"))).unwrap();
            }
            reader.join().unwrap();
        });

        assert_eq!(shared.snapshot().len(), 21);
    }
}
