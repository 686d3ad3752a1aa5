use serde::Serialize;

use crate::catalog::Catalog;
use crate::messaging::MessageBook;
use crate::models::{Activation, FormattedRecommendation, RecommendationItem, Role, SituationProfile};
use crate::relevance::select_activations;
use crate::tone::{format_recommendation, role_tone, ToneDescriptor};

#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    #[serde(flatten)]
    pub activation: Activation,
    pub headline: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub role: Role,
    pub tone: ToneDescriptor,
    pub panels: Vec<Panel>,
    pub recommendations: Vec<FormattedRecommendation>,
}

impl Dashboard {
    pub fn panel_ids(&self) -> Vec<&str> {
        self.panels.iter().map(|p| p.activation.id.as_str()).collect()
    }
}

pub fn compose_dashboard(
    catalog: &Catalog,
    profile: &SituationProfile,
    role: Role,
    book: &MessageBook,
    recommendations: &[RecommendationItem],
    limit: Option<usize>,
) -> Dashboard {
    let context = profile.context();
    let activations = select_activations(catalog, profile, role);
    let keep = limit.unwrap_or(activations.len());

    let panels = activations
        .into_iter()
        .take(keep)
        .map(|activation| {
            let headline = catalog
                .get(&activation.id)
                .and_then(|widget| widget.headline_key())
                .map(|key| book.adapt(key, role, &context));
            Panel {
                activation,
                headline,
            }
        })
        .collect();

    Dashboard {
        role,
        tone: role_tone(role).clone(),
        panels,
        recommendations: recommendations
            .iter()
            .map(|rec| format_recommendation(rec, role))
            .collect(),
    }
}
