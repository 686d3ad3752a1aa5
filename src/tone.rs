use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::models::{FormattedRecommendation, RecommendationItem, Role};

pub const ADMIN_PREFIX: &str = "Technical action:";
pub const CONTRIBUTOR_PREFIX: &str = "Suggested action:";
pub const USER_PREFIX: &str = "Suggestion:";

/// Negative terms and their softer replacements, matched whole-word and
/// case-insensitively. Earlier entries win when alternatives overlap.
const CONSTRUCTIVE_TERMS: &[(&str, &str)] = &[
    ("critical", "key"),
    ("blockers", "obstacles"),
    ("blocker", "obstacle"),
    ("blocked", "waiting"),
    ("risks", "considerations"),
    ("risk", "consideration"),
    ("failures", "setbacks"),
    ("failure", "setback"),
    ("failing", "struggling"),
    ("problems", "challenges"),
    ("problem", "challenge"),
    ("urgent", "timely"),
    ("bottleneck", "slowdown"),
];

// One capture group per term, in table order, so a match maps back to its row even
// when Unicode case folding makes the matched text differ from the term. The pattern
// is compiled in a unit test.
static CONSTRUCTIVE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = CONSTRUCTIVE_TERMS
        .iter()
        .map(|(term, _)| format!("({})", regex::escape(term)))
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
        .expect("constructive term pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneStyle {
    Technical,
    Collaborative,
    Encouraging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Metrics,
    Actions,
    Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneDescriptor {
    pub style: ToneStyle,
    pub show_patterns: bool,
    pub show_metrics: bool,
    pub show_raw_data: bool,
    pub emphasis: Emphasis,
}

static ADMIN_TONE: ToneDescriptor = ToneDescriptor {
    style: ToneStyle::Technical,
    show_patterns: true,
    show_metrics: true,
    show_raw_data: true,
    emphasis: Emphasis::Metrics,
};

static CONTRIBUTOR_TONE: ToneDescriptor = ToneDescriptor {
    style: ToneStyle::Collaborative,
    show_patterns: true,
    show_metrics: true,
    show_raw_data: false,
    emphasis: Emphasis::Actions,
};

static USER_TONE: ToneDescriptor = ToneDescriptor {
    style: ToneStyle::Encouraging,
    show_patterns: false,
    show_metrics: false,
    show_raw_data: false,
    emphasis: Emphasis::Progress,
};

pub fn role_tone(role: Role) -> &'static ToneDescriptor {
    match role {
        Role::Admin => &ADMIN_TONE,
        Role::Contributor => &CONTRIBUTOR_TONE,
        Role::User => &USER_TONE,
    }
}

pub fn role_tone_for(role_name: &str) -> &'static ToneDescriptor {
    role_tone(Role::from_name(role_name).unwrap_or(Role::User))
}

/// Softens negatively coded words in one left-to-right pass. Replacement text is never
/// matched again and everything else is copied through unchanged.
pub fn constructive_rewrite(text: &str) -> String {
    CONSTRUCTIVE_PATTERN
        .replace_all(text, |caps: &Captures<'_>| {
            let matched = &caps[0];
            let replacement = CONSTRUCTIVE_TERMS
                .iter()
                .enumerate()
                .find(|(index, _)| caps.get(index + 1).is_some())
                .map_or(matched, |(_, (_, replacement))| *replacement);
            match_leading_case(matched, replacement)
        })
        .into_owned()
}

fn match_leading_case(original: &str, replacement: &str) -> String {
    let starts_upper = original.chars().next().is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if starts_upper => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}

pub fn format_recommendation(rec: &RecommendationItem, role: Role) -> FormattedRecommendation {
    let (prefix, show_details, description) = match role {
        Role::Admin => (ADMIN_PREFIX, true, rec.description.clone()),
        Role::Contributor => (CONTRIBUTOR_PREFIX, true, rec.description.clone()),
        Role::User => (USER_PREFIX, false, constructive_rewrite(&rec.description)),
    };

    FormattedRecommendation {
        kind: rec.kind.clone(),
        title: rec.title.clone(),
        description,
        priority: rec.priority,
        prefix: prefix.to_string(),
        show_details,
    }
}

pub fn format_recommendation_for(rec: &RecommendationItem, role_name: &str) -> FormattedRecommendation {
    format_recommendation(rec, Role::from_name(role_name).unwrap_or(Role::User))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn recommendation(description: &str) -> RecommendationItem {
        RecommendationItem {
            kind: "default".to_string(),
            title: "X".to_string(),
            description: description.to_string(),
            priority: Priority::High,
        }
    }

    #[test]
    fn user_recommendation_is_softened_and_hides_details() {
        let formatted = format_recommendation(&recommendation("This is a critical blocker"), Role::User);
        assert_eq!(formatted.description, "This is a key obstacle");
        assert!(!formatted.show_details);
        assert_eq!(formatted.prefix, USER_PREFIX);
        assert_eq!(formatted.title, "X");
        assert_eq!(formatted.priority, Priority::High);
    }

    #[test]
    fn admin_and_contributor_keep_description() {
        let rec = recommendation("This is a critical blocker");
        let admin = format_recommendation(&rec, Role::Admin);
        let contributor = format_recommendation(&rec, Role::Contributor);
        assert_eq!(admin.description, rec.description);
        assert_eq!(admin.prefix, ADMIN_PREFIX);
        assert!(admin.show_details);
        assert_eq!(contributor.prefix, CONTRIBUTOR_PREFIX);
        assert!(contributor.show_details);
    }

    #[test]
    fn unknown_role_name_formats_like_user() {
        let rec = recommendation("Risk of failure");
        assert_eq!(
            format_recommendation_for(&rec, "guest"),
            format_recommendation(&rec, Role::User)
        );
    }

    #[test]
    fn rewrite_is_case_insensitive_and_keeps_leading_capital() {
        assert_eq!(
            constructive_rewrite("CRITICAL: Blockers remain, one problem."),
            "Key: Obstacles remain, one challenge."
        );
    }

    #[test]
    fn rewrite_matches_whole_words_only() {
        assert_eq!(constructive_rewrite("Unblocked riskier paths"), "Unblocked riskier paths");
    }

    #[test]
    fn rewrite_does_not_cascade() {
        // "consideration" must not be reconsidered, and the plural term wins over its stem.
        assert_eq!(
            constructive_rewrite("risks and a risk"),
            "considerations and a consideration"
        );
    }

    #[test]
    fn rewrite_maps_case_folded_matches_to_their_term() {
        // U+212A KELVIN SIGN folds to `k`.
        assert_eq!(constructive_rewrite("one bloc\u{212A}er"), "one obstacle");
        assert_eq!(constructive_rewrite("\u{212A}ey risks"), "\u{212A}ey considerations");
    }

    #[test]
    fn constructive_pattern_compiles_with_a_group_per_term() {
        assert_eq!(CONSTRUCTIVE_PATTERN.captures_len(), CONSTRUCTIVE_TERMS.len() + 1);
    }

    #[test]
    fn tone_falls_back_to_user() {
        assert!(std::ptr::eq(role_tone_for("not_a_role"), role_tone_for("user")));
        assert_eq!(role_tone_for("admin").style, ToneStyle::Technical);
        assert!(role_tone(Role::Admin).show_raw_data);
        assert!(!role_tone(Role::Contributor).show_raw_data);
    }
}
