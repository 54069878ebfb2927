use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Wildcard token for the gender preference: any candidate gender qualifies.
pub const GENDER_ANY: &str = "any";

/// Sentinel used by the profile store when a user has not shared a location.
pub const LOCATION_UNKNOWN: &str = "unknown";

/// A user's stated matchmaking preferences.
///
/// Every field is optional: the profile store may return NULLs for users who
/// never finished onboarding. Missing fields degrade to zero credit during
/// scoring, they are never an error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Preferences {
    /// Desired age range lower bound, inclusive.
    pub age_min: Option<i32>,
    /// Desired age range upper bound, inclusive.
    pub age_max: Option<i32>,
    /// Desired gender token, or [`GENDER_ANY`] as a wildcard.
    pub gender: Option<String>,
    /// Desired relationship goal, compared by substring containment in both
    /// directions.
    pub relationship_goal: Option<String>,
}

impl Preferences {
    /// Whether the age range is fully specified.
    pub fn has_age_range(&self) -> bool {
        self.age_min.is_some() && self.age_max.is_some()
    }
}

/// Scoring-relevant view of a user profile.
///
/// Read-only input to the scorer; the engine never writes profiles.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Opaque user id.
    pub user_id: String,
    pub age: Option<i32>,
    /// Gender token; `None` means unspecified.
    pub gender: Option<String>,
    /// Free-form location string; `None`, empty, or "unknown" all mean the
    /// user has not shared a usable location.
    pub location: Option<String>,
    /// Free-form interest tokens.
    pub interests: Vec<String>,
    /// Raw values text blob.
    pub values: String,
    /// Raw relationship-goal text blob.
    pub relationship_goal: String,
    pub preferences: Preferences,
}

impl Profile {
    /// Whether this profile carries a usable (non-sentinel) location.
    pub fn has_known_location(&self) -> bool {
        match self.location.as_deref() {
            Some(loc) => {
                let trimmed = loc.trim();
                !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(LOCATION_UNKNOWN)
            }
            None => false,
        }
    }
}

/// A candidate that survived scoring, with the factors that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredCandidate {
    /// Candidate user id.
    pub user_id: String,
    /// Compatibility score, 0..=100.
    pub score: u32,
    /// One short phrase per factor that contributed; full list, display
    /// truncation is the ranking layer's job.
    pub reasons: Vec<String>,
}

/// Canonical ordered pair of user ids for a match row.
///
/// The lexicographically smaller id always goes first, so `(A, B)` and
/// `(B, A)` collapse to one row. Persisting both orderings would double-count
/// a match; this type is the only way match rows get their id columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchPair {
    pub first: String,
    pub second: String,
}

impl MatchPair {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }
}

/// Persisted match row.
///
/// Rows are created and replaced only by the ranking service, as a batch per
/// requester; they are never mutated field-by-field.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MatchRecord {
    /// Canonically smaller user id of the pair.
    pub user_a: String,
    /// Canonically larger user id of the pair.
    pub user_b: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

impl MatchRecord {
    /// The id of the other participant, from `user_id`'s point of view.
    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.user_a == user_id {
            &self.user_b
        } else {
            &self.user_a
        }
    }
}
