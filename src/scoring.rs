//! Compatibility scoring between a requesting user and one candidate.
//!
//! The scorer is a pure function over two profiles: no I/O, no clock, no
//! randomness. It is total by contract — any syntactically valid pair of
//! profiles scores without error, with missing fields degrading to zero
//! credit for the factor they belong to.

use crate::models::{Profile, ScoredCandidate, GENDER_ANY};

/// Full credit for a candidate age inside the requester's range.
pub const AGE_WEIGHT: f64 = 15.0;
/// Full credit for a gender-preference match (or wildcard).
pub const GENDER_WEIGHT: f64 = 15.0;
/// Cap for the shared-interests factor.
pub const INTERESTS_WEIGHT: f64 = 30.0;
/// Cap for the shared-values factor.
pub const VALUES_WEIGHT: f64 = 20.0;
/// Full credit for aligned relationship goals.
pub const GOAL_WEIGHT: f64 = 10.0;
/// Location bonus when the candidate's location is known.
pub const LOCATION_KNOWN_BONUS: f64 = 20.0;
/// Location bonus when it is not; this factor never contributes zero.
pub const LOCATION_UNKNOWN_BONUS: f64 = 10.0;
/// Final scores are capped here after summing.
pub const MAX_SCORE: u32 = 100;

/// How many reason phrases are shown to a user.
pub const MAX_DISPLAY_REASONS: usize = 3;

/// Fixed vocabulary the default values matcher intersects both texts against.
pub const VALUES_VOCABULARY: [&str; 10] = [
    "family",
    "career",
    "travel",
    "health",
    "growth",
    "honesty",
    "loyalty",
    "adventure",
    "success",
    "balance",
];

/// Outcome of a values-alignment comparison.
#[derive(Debug, Clone, Default)]
pub struct ValuesAlignment {
    /// Points awarded, already capped to [`VALUES_WEIGHT`].
    pub points: f64,
    /// Which keywords (or strategy-specific tokens) matched, for the reason
    /// phrase.
    pub matched: Vec<String>,
}

/// Strategy seam for comparing two raw values texts.
///
/// The default is a crude fixed-vocabulary keyword intersection; swapping in
/// a better similarity measure must not touch the rest of the scorer.
pub trait ValuesMatcher: Send + Sync {
    fn align(&self, a: &str, b: &str) -> ValuesAlignment;
}

/// Default matcher: a vocabulary keyword counts iff it appears
/// (case-insensitive substring) in both texts.
#[derive(Debug, Clone, Default)]
pub struct KeywordValuesMatcher;

impl ValuesMatcher for KeywordValuesMatcher {
    fn align(&self, a: &str, b: &str) -> ValuesAlignment {
        let a = a.to_lowercase();
        let b = b.to_lowercase();

        let matched: Vec<String> = VALUES_VOCABULARY
            .iter()
            .filter(|kw| a.contains(**kw) && b.contains(**kw))
            .map(|kw| kw.to_string())
            .collect();

        let points = (VALUES_WEIGHT * matched.len() as f64 / VALUES_VOCABULARY.len() as f64)
            .min(VALUES_WEIGHT);

        ValuesAlignment { points, matched }
    }
}

/// Weighted multi-factor compatibility scorer.
pub struct CompatibilityScorer {
    values_matcher: Box<dyn ValuesMatcher>,
}

impl Default for CompatibilityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl CompatibilityScorer {
    pub fn new() -> Self {
        Self {
            values_matcher: Box::new(KeywordValuesMatcher),
        }
    }

    pub fn with_matcher(values_matcher: Box<dyn ValuesMatcher>) -> Self {
        Self { values_matcher }
    }

    /// Score one candidate against the requester's stated preferences.
    ///
    /// Each factor contributes independently; the sum is capped at
    /// [`MAX_SCORE`] and rounded to the nearest integer. Every factor that
    /// fired appends a short reason phrase.
    pub fn score(&self, requester: &Profile, candidate: &Profile) -> ScoredCandidate {
        let mut total = 0.0;
        let mut reasons = Vec::new();

        // Age fit: a missing range (or missing candidate age) is never
        // satisfied, not an error.
        if age_in_range(requester, candidate) {
            total += AGE_WEIGHT;
            reasons.push("compatible age".to_string());
        }

        if gender_matches(requester, candidate) {
            total += GENDER_WEIGHT;
            reasons.push("matches gender preference".to_string());
        }

        let shared = shared_interests(requester, candidate);
        if !shared.is_empty() {
            // Proportional to coverage of the requester's own interest set;
            // deliberately asymmetric, not a Jaccard index.
            let requester_total = distinct_lowercase(&requester.interests).len().max(1);
            let points =
                (INTERESTS_WEIGHT * shared.len() as f64 / requester_total as f64).min(INTERESTS_WEIGHT);
            total += points;
            reasons.push(format!(
                "{} shared interest{} ({})",
                shared.len(),
                if shared.len() == 1 { "" } else { "s" },
                shared.join(", ")
            ));
        }

        let alignment = self
            .values_matcher
            .align(&requester.values, &candidate.values);
        if alignment.points > 0.0 {
            total += alignment.points.min(VALUES_WEIGHT);
            reasons.push(format!("shared values ({})", alignment.matched.join(", ")));
        }

        // The requester side of the comparison is the stated preference,
        // not the profile's own goal blob; the candidate side is the blob.
        let wanted_goal = requester.preferences.relationship_goal.as_deref().unwrap_or("");
        if goals_align(wanted_goal, &candidate.relationship_goal) {
            total += GOAL_WEIGHT;
            reasons.push("aligned relationship goals".to_string());
        }

        // Presence bonus, not proximity: no geodistance anywhere in the
        // engine. Only the known case earns a reason phrase.
        if candidate.has_known_location() {
            total += LOCATION_KNOWN_BONUS;
            reasons.push("location on profile".to_string());
        } else {
            total += LOCATION_UNKNOWN_BONUS;
        }

        if reasons.is_empty() {
            reasons.push("general compatibility".to_string());
        }

        ScoredCandidate {
            user_id: candidate.user_id.clone(),
            score: (total.round() as u32).min(MAX_SCORE),
            reasons,
        }
    }
}

/// Score with the default keyword values matcher.
pub fn score(requester: &Profile, candidate: &Profile) -> ScoredCandidate {
    CompatibilityScorer::new().score(requester, candidate)
}

impl ScoredCandidate {
    /// Reason phrases shown to a user, capped to the first
    /// [`MAX_DISPLAY_REASONS`].
    pub fn display_reasons(&self) -> &[String] {
        &self.reasons[..self.reasons.len().min(MAX_DISPLAY_REASONS)]
    }
}

fn age_in_range(requester: &Profile, candidate: &Profile) -> bool {
    match (
        requester.preferences.age_min,
        requester.preferences.age_max,
        candidate.age,
    ) {
        (Some(min), Some(max), Some(age)) => age >= min && age <= max,
        _ => false,
    }
}

fn gender_matches(requester: &Profile, candidate: &Profile) -> bool {
    let Some(wanted) = requester.preferences.gender.as_deref() else {
        return false;
    };
    if wanted.eq_ignore_ascii_case(GENDER_ANY) {
        return true;
    }
    candidate
        .gender
        .as_deref()
        .is_some_and(|g| g.eq_ignore_ascii_case(wanted))
}

/// Requester interest tokens also present in the candidate's set,
/// case-insensitive, in the requester's order.
fn shared_interests(requester: &Profile, candidate: &Profile) -> Vec<String> {
    let candidate_set = distinct_lowercase(&candidate.interests);
    let mut seen = std::collections::HashSet::new();
    requester
        .interests
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty() && candidate_set.contains(i) && seen.insert(i.clone()))
        .collect()
}

fn distinct_lowercase(tokens: &[String]) -> std::collections::HashSet<String> {
    tokens
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Case-insensitive substring containment in either direction. Empty text
/// never aligns; without the guard an empty string is a substring of
/// everything.
fn goals_align(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preferences;

    fn requester() -> Profile {
        Profile {
            user_id: "u-requester".to_string(),
            age: Some(28),
            gender: Some("Male".to_string()),
            location: Some("Austin".to_string()),
            interests: vec!["hiking".to_string(), "travel".to_string()],
            values: "family, travel".to_string(),
            relationship_goal: "long-term".to_string(),
            preferences: Preferences {
                age_min: Some(25),
                age_max: Some(35),
                gender: Some("Female".to_string()),
                relationship_goal: Some("long-term".to_string()),
            },
        }
    }

    fn bare_candidate(id: &str) -> Profile {
        Profile {
            user_id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn age_boundary_is_inclusive() {
        let req = requester();
        for age in [25, 35] {
            let mut cand = bare_candidate("c1");
            cand.age = Some(age);
            assert!(age_in_range(&req, &cand), "age {} should be in range", age);
        }
        for age in [24, 36] {
            let mut cand = bare_candidate("c1");
            cand.age = Some(age);
            assert!(!age_in_range(&req, &cand), "age {} should be outside", age);
        }
    }

    #[test]
    fn missing_age_range_never_satisfied() {
        let mut req = requester();
        req.preferences.age_min = None;
        let mut cand = bare_candidate("c1");
        cand.age = Some(30);
        assert!(!age_in_range(&req, &cand));
    }

    #[test]
    fn gender_wildcard_matches_anything() {
        let mut req = requester();
        req.preferences.gender = Some("any".to_string());
        let mut cand = bare_candidate("c1");
        assert!(gender_matches(&req, &cand));
        cand.gender = Some("Female".to_string());
        assert!(gender_matches(&req, &cand));
    }

    #[test]
    fn gender_preference_missing_gives_no_credit() {
        let mut req = requester();
        req.preferences.gender = None;
        let mut cand = bare_candidate("c1");
        cand.gender = Some("Female".to_string());
        assert!(!gender_matches(&req, &cand));
    }

    #[test]
    fn empty_requester_interests_contribute_zero() {
        let mut req = requester();
        req.interests.clear();
        let mut cand = bare_candidate("c1");
        cand.interests = vec!["hiking".to_string(), "travel".to_string()];
        // No div-by-zero, no credit, and no interest reason phrase.
        let scored = score(&req, &cand);
        assert!(scored.reasons.iter().all(|r| !r.contains("interest")));
    }

    #[test]
    fn interest_credit_is_requester_centric() {
        let req = requester();
        let mut cand = bare_candidate("c1");
        // Candidate has many interests but covers only half of the
        // requester's set: 1/2 * 30 = 15, not a Jaccard ratio.
        cand.interests = vec![
            "hiking".to_string(),
            "cooking".to_string(),
            "gaming".to_string(),
            "painting".to_string(),
        ];
        let with = score(&req, &cand).score;
        cand.interests.clear();
        let without = score(&req, &cand).score;
        assert_eq!(with - without, 15);
    }

    #[test]
    fn values_keyword_must_appear_in_both_texts() {
        let matcher = KeywordValuesMatcher;
        let alignment = matcher.align("family-oriented travel lover", "family, travel");
        assert_eq!(alignment.matched, vec!["family", "travel"]);
        assert!((alignment.points - 4.0).abs() < f64::EPSILON);

        let one_sided = matcher.align("family first", "career focused");
        assert!(one_sided.matched.is_empty());
        assert_eq!(one_sided.points, 0.0);
    }

    #[test]
    fn goal_alignment_reads_stated_preference_not_profile_blob() {
        let mut req = requester();
        // The requester's own goal text disagrees with what they asked for;
        // the stated preference decides.
        req.relationship_goal = "casual".to_string();
        req.preferences.relationship_goal = Some("long-term".to_string());

        let mut cand = bare_candidate("c1");
        cand.relationship_goal = "looking for long-term partner".to_string();
        let with_pref = score(&req, &cand);
        assert!(with_pref
            .reasons
            .iter()
            .any(|r| r == "aligned relationship goals"));

        // Without a stated preference there is no goal credit, even though
        // the profile blob would substring-match the candidate.
        req.relationship_goal = "long-term".to_string();
        req.preferences.relationship_goal = None;
        let without_pref = score(&req, &cand);
        assert!(!without_pref
            .reasons
            .iter()
            .any(|r| r == "aligned relationship goals"));
        assert_eq!(with_pref.score - without_pref.score, GOAL_WEIGHT as u32);
    }

    #[test]
    fn empty_goal_never_aligns() {
        assert!(!goals_align("", "long-term"));
        assert!(!goals_align("long-term", ""));
        assert!(!goals_align("", ""));
        assert!(goals_align("long-term", "looking for long-term partner"));
        assert!(goals_align("Looking for LONG-TERM partner", "long-term"));
    }

    #[test]
    fn location_bonus_never_zero() {
        let req = requester();
        let cand = bare_candidate("c1");
        // Fully empty candidate still earns the unknown-location bonus.
        assert_eq!(score(&req, &cand).score, LOCATION_UNKNOWN_BONUS as u32);
    }

    #[test]
    fn generic_reason_when_nothing_fired() {
        let req = requester();
        let scored = score(&req, &bare_candidate("c1"));
        assert_eq!(scored.reasons, vec!["general compatibility".to_string()]);
    }

    #[test]
    fn strong_candidate_scores_seventy_nine() {
        let req = requester();
        let cand = Profile {
            user_id: "candidate-a".to_string(),
            age: Some(30),
            gender: Some("Female".to_string()),
            location: Some("Austin".to_string()),
            interests: vec!["hiking".to_string(), "cooking".to_string()],
            values: "family-oriented travel lover".to_string(),
            relationship_goal: "looking for long-term partner".to_string(),
            preferences: Preferences::default(),
        };
        let scored = score(&req, &cand);
        // 15 age + 15 gender + 15 interests + 4 values + 10 goal + 20 location
        assert_eq!(scored.score, 79);
        assert!(scored.reasons.len() >= MAX_DISPLAY_REASONS);
    }

    #[test]
    fn incompatible_candidate_scores_ten() {
        let req = requester();
        let cand = Profile {
            user_id: "candidate-b".to_string(),
            age: Some(45),
            gender: Some("Male".to_string()),
            location: Some("unknown".to_string()),
            interests: vec!["golf".to_string()],
            values: String::new(),
            relationship_goal: String::new(),
            preferences: Preferences::default(),
        };
        assert_eq!(score(&req, &cand).score, 10);
    }

    #[test]
    fn score_is_deterministic() {
        let req = requester();
        let mut cand = bare_candidate("c1");
        cand.age = Some(30);
        cand.gender = Some("Female".to_string());
        cand.interests = vec!["travel".to_string()];
        let first = score(&req, &cand);
        let second = score(&req, &cand);
        assert_eq!(first, second);
    }

    #[test]
    fn score_never_exceeds_cap() {
        // Max out every factor: 15 + 15 + 30 + 20 + 10 + 20 = 110, capped.
        let mut req = requester();
        req.preferences.gender = Some("any".to_string());
        req.values = VALUES_VOCABULARY.join(" ");
        let cand = Profile {
            user_id: "c-max".to_string(),
            age: Some(30),
            gender: Some("Female".to_string()),
            location: Some("Austin".to_string()),
            interests: req.interests.clone(),
            values: VALUES_VOCABULARY.join(" "),
            relationship_goal: "long-term".to_string(),
            preferences: Preferences::default(),
        };
        assert_eq!(score(&req, &cand).score, MAX_SCORE);
    }

    #[test]
    fn pluggable_matcher_replaces_values_strategy() {
        struct FlatMatcher;
        impl ValuesMatcher for FlatMatcher {
            fn align(&self, _a: &str, _b: &str) -> ValuesAlignment {
                ValuesAlignment {
                    points: VALUES_WEIGHT,
                    matched: vec!["everything".to_string()],
                }
            }
        }

        let req = requester();
        let cand = bare_candidate("c1");
        let default = CompatibilityScorer::new().score(&req, &cand);
        let flat = CompatibilityScorer::with_matcher(Box::new(FlatMatcher)).score(&req, &cand);
        assert_eq!(flat.score - default.score, VALUES_WEIGHT as u32);
    }
}
