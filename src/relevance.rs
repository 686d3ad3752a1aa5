use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::catalog::{panic_message, Catalog, WidgetDescriptor};
use crate::models::{Activation, Role, SituationProfile};

pub const MIN_RELEVANCE: f64 = 0.0;
pub const MAX_RELEVANCE: f64 = 100.0;

/// Ranks every widget `role` may see under `profile`.
///
/// Widgets are gated by role, then `hide_if`, then `show_if`; survivors are scored,
/// clamped to [0, 100] and stable-sorted by relevance then priority, both descending.
/// A widget whose predicates or score panic is dropped from this evaluation only.
pub fn select_activations(
    catalog: &Catalog,
    profile: &SituationProfile,
    role: Role,
) -> Vec<Activation> {
    let mut activations: Vec<Activation> = catalog
        .iter()
        .filter(|widget| widget.allowed_roles().contains(role))
        .filter_map(|widget| evaluate(widget, profile, role))
        .collect();

    activations.sort_by(rank_order);
    activations
}

fn evaluate(widget: &WidgetDescriptor, profile: &SituationProfile, role: Role) -> Option<Activation> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        if widget.is_hidden(profile) {
            debug!(widget = widget.id(), "hidden by hide_if");
            return None;
        }
        if !widget.is_shown(profile) {
            debug!(widget = widget.id(), "not shown by show_if");
            return None;
        }
        Some(widget.raw_score(profile))
    }));

    let raw = match outcome {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(payload) => {
            warn!(
                widget = widget.id(),
                error = %panic_message(payload.as_ref()),
                "widget evaluation panicked, excluding it"
            );
            return None;
        }
    };

    if raw.is_nan() {
        warn!(widget = widget.id(), "relevance score is NaN, excluding it");
        return None;
    }

    Some(Activation {
        id: widget.id().to_string(),
        relevance: clamp_relevance(raw),
        priority: widget.priority_weight(),
        config: widget.config_for(role),
    })
}

pub fn clamp_relevance(raw: f64) -> f64 {
    let clamped = raw.clamp(MIN_RELEVANCE, MAX_RELEVANCE);
    // -0.0 sorts below 0.0 under total_cmp
    if clamped == 0.0 {
        0.0
    } else {
        clamped
    }
}

fn rank_order(a: &Activation, b: &Activation) -> Ordering {
    b.relevance
        .total_cmp(&a.relevance)
        .then_with(|| b.priority.cmp(&a.priority))
}
