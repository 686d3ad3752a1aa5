use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::compose::Dashboard;
use crate::models::{Role, WidgetSummary};

pub struct TeamDashboard {
    pub team: String,
    pub dashboard: Dashboard,
}

pub fn summarize_by_widget(teams: &[TeamDashboard]) -> Vec<WidgetSummary> {
    let mut map: HashMap<&str, (usize, f64)> = HashMap::new();

    for team in teams {
        for panel in &team.dashboard.panels {
            let entry = map.entry(panel.activation.id.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += panel.activation.relevance;
        }
    }

    let mut summaries: Vec<WidgetSummary> = map
        .into_iter()
        .map(|(id, (count, total_relevance))| WidgetSummary {
            id: id.to_string(),
            count,
            avg_relevance: if count == 0 {
                0.0
            } else {
                total_relevance / count as f64
            },
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
    summaries
}

pub fn build_report(generated_on: NaiveDate, role: Role, teams: &[TeamDashboard]) -> String {
    let summaries = summarize_by_widget(teams);

    let mut output = String::new();

    let _ = writeln!(output, "# Adaptive Dashboard Report");
    let _ = writeln!(
        output,
        "Composed for the {} role across {} teams on {}",
        role,
        teams.len(),
        generated_on
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Widget Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No widgets surfaced for any team.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: shown to {} teams (avg relevance {:.1})",
                summary.id, summary.count, summary.avg_relevance
            );
        }
    }

    for team in teams {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", team.team);

        if team.dashboard.panels.is_empty() {
            let _ = writeln!(output, "No widgets match this team's situation.");
        } else {
            for panel in &team.dashboard.panels {
                let _ = writeln!(
                    output,
                    "- {} ({:.1}): {}",
                    panel.activation.id,
                    panel.activation.relevance,
                    panel.headline.as_deref().unwrap_or("-")
                );
            }
        }

        if !team.dashboard.recommendations.is_empty() {
            let _ = writeln!(output);
            let _ = writeln!(output, "### Recommendations");
            for rec in &team.dashboard.recommendations {
                let _ = writeln!(output, "- {} {}: {}", rec.prefix, rec.title, rec.description);
                if rec.show_details {
                    let _ = writeln!(output, "  - {} / {} priority", rec.kind, rec.priority);
                }
            }
        }
    }

    output
}
