use serde_json::json;

use crate::catalog::{Catalog, WidgetDescriptor};
use crate::error::CatalogError;
use crate::models::Role;

const STAFF: &[Role] = &[Role::Admin, Role::Contributor];

fn flag(value: bool, weight: f64) -> f64 {
    if value {
        weight
    } else {
        0.0
    }
}

// Caps keep one runaway metric from pushing every other widget off the top.
fn capped(count: u32, cap: u32, weight: f64) -> f64 {
    f64::from(count.min(cap)) * weight
}

pub fn builtin_widgets() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("team-overview", "Team Overview", "team")
            .priority(1)
            .roles(&Role::ALL)
            .headline("teamOverview")
            .score(|_| 20.0)
            .config(Role::Admin, json!({ "layout": "grid", "showMembers": true, "showCapacity": true }))
            .config(Role::Contributor, json!({ "layout": "grid", "showMembers": true, "showCapacity": false }))
            .config(Role::User, json!({ "layout": "compact", "showMembers": true, "showCapacity": false })),
        WidgetDescriptor::new("sprint-health", "Sprint Health", "sprint")
            .priority(9)
            .roles(&Role::ALL)
            .headline("sprintHealth")
            .show_if(|p| p.active_sprint)
            .score(|p| {
                50.0 + flag(p.velocity_unstable, 20.0)
                    + flag(p.trend_negative, 15.0)
                    + flag(p.sprint_day >= 7, 10.0)
            })
            .config(Role::Admin, json!({ "chart": "burndown", "showVariance": true, "showForecast": true }))
            .config(Role::Contributor, json!({ "chart": "burndown", "showVariance": false, "showForecast": true }))
            .config(Role::User, json!({ "chart": "progress", "showVariance": false, "showForecast": false })),
        WidgetDescriptor::new("blockers", "Blockers", "flow")
            .priority(10)
            .roles(STAFF)
            .headline("totalBlockers")
            .show_if(|p| p.blockers_count > 0)
            .score(|p| 40.0 + capped(p.blockers_count, 4, 10.0) + flag(p.wip_high, 20.0))
            .config(Role::Admin, json!({ "groupBy": "owner", "showAge": true, "limit": 20 }))
            .config(Role::Contributor, json!({ "groupBy": "assignee", "showAge": true, "limit": 10 })),
        WidgetDescriptor::new("risk-radar", "Risk Radar", "flow")
            .priority(8)
            .roles(STAFF)
            .headline("activeRisks")
            .show_if(|p| p.risks_count > 0)
            .score(|p| 35.0 + capped(p.risks_count, 5, 8.0) + capped(p.critical_patterns, 3, 5.0))
            .config(Role::Admin, json!({ "view": "matrix", "showProbability": true }))
            .config(Role::Contributor, json!({ "view": "list", "showProbability": false })),
        WidgetDescriptor::new("wip-monitor", "WIP Monitor", "flow")
            .priority(7)
            .roles(STAFF)
            .headline("wipHigh")
            .show_if(|p| p.wip_high)
            .score(|p| 55.0 + capped(p.blockers_count, 5, 5.0))
            .config(Role::Admin, json!({ "showLimits": true, "byColumn": true }))
            .config(Role::Contributor, json!({ "showLimits": true, "byColumn": false })),
        WidgetDescriptor::new("velocity-trend", "Velocity Trend", "analytics")
            .priority(6)
            .roles(&[Role::Admin])
            .headline("velocityTrend")
            .show_if(|p| p.analysis_count > 0 || p.data_collected >= 14)
            .hide_if(|p| p.data_collected < 7)
            .score(|p| {
                30.0 + flag(p.velocity_unstable, 25.0)
                    + flag(p.trend_negative, 15.0)
                    + p.velocity_variance.clamp(0.0, 50.0) * 0.4
            })
            .config(Role::Admin, json!({ "sprints": 6, "showVariance": true, "showRawPoints": true })),
        WidgetDescriptor::new("urgent-actions", "Urgent Actions", "actions")
            .priority(10)
            .roles(STAFF)
            .headline("urgentActions")
            .show_if(|p| p.urgent_actions_count > 0)
            .score(|p| 70.0 + capped(p.urgent_actions_count, 3, 10.0))
            .config(Role::Admin, json!({ "showOwner": true, "allowDismiss": true }))
            .config(Role::Contributor, json!({ "showOwner": true, "allowDismiss": false })),
        WidgetDescriptor::new("recommendations", "Recommendations", "actions")
            .priority(5)
            .roles(&Role::ALL)
            .headline("recommendations")
            .show_if(|p| p.recommendations_count > 0)
            .score(|p| 45.0 + capped(p.urgent_actions_count, 3, 10.0) + capped(p.quick_wins_count, 5, 3.0))
            .config(Role::Admin, json!({ "limit": 10, "showRationale": true }))
            .config(Role::Contributor, json!({ "limit": 5, "showRationale": true }))
            .config(Role::User, json!({ "limit": 3, "showRationale": false })),
        WidgetDescriptor::new("quick-wins", "Quick Wins", "actions")
            .priority(4)
            .roles(&Role::ALL)
            .headline("quickWins")
            .show_if(|p| p.quick_wins_count > 0)
            .score(|p| 40.0 + capped(p.quick_wins_count, 6, 5.0))
            .config(Role::Admin, json!({ "limit": 8 }))
            .config(Role::Contributor, json!({ "limit": 5 }))
            .config(Role::User, json!({ "limit": 3 })),
        WidgetDescriptor::new("pattern-insights", "Pattern Insights", "analytics")
            .priority(5)
            .roles(STAFF)
            .headline("patternsDetected")
            .show_if(|p| p.patterns_detected > 0)
            .score(|p| 30.0 + capped(p.critical_patterns, 3, 15.0) + capped(p.high_patterns, 4, 8.0))
            .config(Role::Admin, json!({ "showSeverity": true, "showEvidence": true }))
            .config(Role::Contributor, json!({ "showSeverity": true, "showEvidence": false })),
        WidgetDescriptor::new("analysis-history", "Analysis History", "analytics")
            .priority(2)
            .roles(STAFF)
            .headline("analysisHistory")
            .show_if(|p| p.analysis_count > 0)
            .score(|p| 25.0 + capped(p.analysis_count, 10, 2.0))
            .config(Role::Admin, json!({ "limit": 20, "showDiff": true }))
            .config(Role::Contributor, json!({ "limit": 10, "showDiff": false })),
        WidgetDescriptor::new("integration-setup", "Integration Setup", "onboarding")
            .priority(3)
            .roles(&[Role::Admin])
            .headline("integrationsPending")
            .show_if(|p| p.integrations_connected < p.integrations_total)
            .score(|p| {
                if p.integrations_connected == 0 {
                    60.0
                } else {
                    40.0 - capped(p.integrations_connected, 4, 5.0)
                }
            })
            .config(Role::Admin, json!({ "showAvailable": true, "allowConnect": true })),
        WidgetDescriptor::new("data-collection", "Data Collection", "onboarding")
            .priority(2)
            .roles(&Role::ALL)
            .headline("dataCollecting")
            .show_if(|p| p.data_collected < 30)
            .hide_if(|p| p.analysis_count >= 5)
            .score(|p| 50.0 - f64::from(p.data_collected))
            .config(Role::Admin, json!({ "showTarget": true, "target": 30 }))
            .config(Role::Contributor, json!({ "showTarget": true, "target": 30 }))
            .config(Role::User, json!({ "showTarget": false })),
    ]
}

pub fn builtin_catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(builtin_widgets())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::builtin_book;
    use crate::models::SituationProfile;
    use crate::relevance::select_activations;

    fn order(profile: &SituationProfile, role: Role) -> Vec<String> {
        let catalog = builtin_catalog().unwrap();
        select_activations(&catalog, profile, role)
            .into_iter()
            .map(|a| a.id)
            .collect()
    }

    #[test]
    fn builtin_catalog_validates() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(catalog.len(), 13);
    }

    #[test]
    fn every_headline_has_a_message() {
        let book = builtin_book();
        for widget in builtin_catalog().unwrap().iter() {
            let key = widget.headline_key().unwrap();
            assert!(book.contains(key), "missing message for {key}");
        }
    }

    #[test]
    fn every_declared_role_has_config() {
        for widget in builtin_catalog().unwrap().iter() {
            for role in widget.allowed_roles().iter() {
                assert!(
                    !widget.config_for(role).is_empty(),
                    "{} has no config for {role}",
                    widget.id()
                );
            }
        }
    }

    #[test]
    fn fresh_workspace_shows_onboarding() {
        let profile = SituationProfile {
            integrations_total: 4,
            ..SituationProfile::default()
        };
        assert_eq!(
            order(&profile, Role::Admin),
            vec!["integration-setup", "data-collection", "team-overview"]
        );
        assert_eq!(order(&profile, Role::User), vec!["data-collection", "team-overview"]);
    }

    #[test]
    fn troubled_sprint_ranks_flow_widgets_first() {
        let profile = SituationProfile {
            active_sprint: true,
            sprint_day: 8,
            blockers_count: 2,
            wip_high: true,
            urgent_actions_count: 1,
            integrations_connected: 3,
            integrations_total: 3,
            data_collected: 60,
            analysis_count: 6,
            ..SituationProfile::default()
        };
        // blockers and urgent-actions tie on score and priority; declaration order decides.
        assert_eq!(
            order(&profile, Role::Contributor),
            vec![
                "blockers",
                "urgent-actions",
                "wip-monitor",
                "sprint-health",
                "analysis-history",
                "team-overview",
            ]
        );
    }

    #[test]
    fn velocity_trend_hidden_without_history() {
        let profile = SituationProfile {
            analysis_count: 3,
            data_collected: 5,
            ..SituationProfile::default()
        };
        assert!(!order(&profile, Role::Admin).contains(&"velocity-trend".to_string()));
    }
}
