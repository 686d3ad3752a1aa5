use std::path::Path;

use anyhow::Context;

use crate::models::{RecommendationItem, SituationProfile, TeamProfile};

pub fn load_profile(path: &Path) -> anyhow::Result<SituationProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let profile: SituationProfile = serde_json::from_str(&raw)
        .with_context(|| format!("invalid situation profile in {}", path.display()))?;
    profile
        .validate()
        .with_context(|| format!("situation profile in {} is inconsistent", path.display()))?;
    Ok(profile)
}

pub fn load_recommendations(path: &Path) -> anyhow::Result<Vec<RecommendationItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read recommendations {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid recommendations in {}", path.display()))
}

/// Reads one situation profile per row, keyed by a `team` column. Missing metric
/// columns default to zero.
pub fn import_csv(csv_path: &Path) -> anyhow::Result<Vec<TeamProfile>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        team: String,
        #[serde(default)]
        active_sprint: bool,
        #[serde(default)]
        sprint_day: u32,
        #[serde(default)]
        blockers_count: u32,
        #[serde(default)]
        risks_count: u32,
        #[serde(default)]
        wip_high: bool,
        #[serde(default)]
        velocity_unstable: bool,
        #[serde(default)]
        velocity_variance: f64,
        #[serde(default)]
        trend_negative: bool,
        #[serde(default)]
        analysis_count: u32,
        #[serde(default)]
        recommendations_count: u32,
        #[serde(default)]
        quick_wins_count: u32,
        #[serde(default)]
        urgent_actions_count: u32,
        #[serde(default)]
        patterns_detected: u32,
        #[serde(default)]
        critical_patterns: u32,
        #[serde(default)]
        high_patterns: u32,
        #[serde(default)]
        integrations_connected: u32,
        #[serde(default)]
        integrations_total: u32,
        #[serde(default)]
        data_collected: u32,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut teams = Vec::new();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("bad row {} in {}", line + 1, csv_path.display()))?;
        let profile = SituationProfile {
            active_sprint: row.active_sprint,
            sprint_day: row.sprint_day,
            blockers_count: row.blockers_count,
            risks_count: row.risks_count,
            wip_high: row.wip_high,
            velocity_unstable: row.velocity_unstable,
            velocity_variance: row.velocity_variance,
            trend_negative: row.trend_negative,
            analysis_count: row.analysis_count,
            recommendations_count: row.recommendations_count,
            quick_wins_count: row.quick_wins_count,
            urgent_actions_count: row.urgent_actions_count,
            patterns_detected: row.patterns_detected,
            critical_patterns: row.critical_patterns,
            high_patterns: row.high_patterns,
            integrations_connected: row.integrations_connected,
            integrations_total: row.integrations_total,
            data_collected: row.data_collected,
        };
        profile
            .validate()
            .with_context(|| format!("team `{}` has an inconsistent profile", row.team))?;
        teams.push(TeamProfile {
            team: row.team,
            profile,
        });
    }

    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn imports_teams_with_partial_columns() {
        let file = write_temp(
            "team,active_sprint,blockers_count,wip_high,integrations_connected,integrations_total\n\
             Platform,true,3,true,1,2\n\
             Mobile,false,0,false,0,0\n",
        );
        let teams = import_csv(file.path()).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].team, "Platform");
        assert_eq!(teams[0].profile.blockers_count, 3);
        assert!(teams[0].profile.wip_high);
        assert_eq!(teams[1].profile, SituationProfile::default());
    }

    #[test]
    fn rejects_inconsistent_integrations() {
        let file = write_temp("team,integrations_connected,integrations_total\nOps,4,1\n");
        let err = import_csv(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("4 integrations connected but only 1 exist"));
    }

    #[test]
    fn rejects_negative_counts() {
        let file = write_temp("team,blockers_count\nOps,-2\n");
        assert!(import_csv(file.path()).is_err());
    }

    #[test]
    fn loads_profile_and_recommendations_json() {
        let profile = write_temp(r#"{"activeSprint": true, "sprintDay": 4}"#);
        let loaded = load_profile(profile.path()).unwrap();
        assert!(loaded.active_sprint);
        assert_eq!(loaded.sprint_day, 4);

        let recs = write_temp(
            r#"[{"type":"flow","title":"Limit WIP","description":"Too many items","priority":"low"}]"#,
        );
        let loaded = load_recommendations(recs.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Limit WIP");
    }
}
