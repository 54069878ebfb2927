use crate::models::{Preferences, Profile};
use serde::{Deserialize, Serialize};

/// Profile-change event delivered by the external dispatcher.
///
/// Sent when a profile is created or updated. Only events with
/// `triggerMatchmaking: true` cause a rebuild; everything else must leave
/// the user's existing match set untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChangeEvent {
    /// Id of the user whose matches should be rebuilt.
    pub requester_id: String,

    /// The requester's current profile attributes.
    pub requester_profile: ProfileAttributes,

    /// Whether this profile change is a matchmaking request.
    #[serde(default)]
    pub trigger_matchmaking: bool,
}

/// Scoring-relevant attributes carried in the trigger payload.
///
/// Everything except preferences is optional; missing fields degrade to
/// zero credit, they never reject the event.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAttributes {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub values: Option<String>,
    pub relationship_goal: Option<String>,
    pub preferences: Option<PreferencesPayload>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPayload {
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub gender: Option<String>,
    pub relationship_goal: Option<String>,
}

impl ProfileChangeEvent {
    /// Build the requester's domain profile from the payload.
    ///
    /// Assumes [`validate`](Self::validate) passed: preferences are present.
    pub fn into_profile(self) -> Profile {
        let attrs = self.requester_profile;
        let prefs = attrs.preferences.unwrap_or_default();
        Profile {
            user_id: self.requester_id,
            age: attrs.age,
            gender: attrs.gender,
            location: attrs.location,
            interests: attrs.interests,
            values: attrs.values.unwrap_or_default(),
            relationship_goal: attrs.relationship_goal.unwrap_or_default(),
            preferences: Preferences {
                age_min: prefs.age_min,
                age_max: prefs.age_max,
                gender: prefs.gender,
                relationship_goal: prefs.relationship_goal,
            },
        }
    }

    /// Input-error checks for a matchmaking request; rejected events never
    /// reach persistence.
    pub fn validate(&self) -> Result<(), String> {
        if self.requester_id.trim().is_empty() {
            return Err("Missing requester id in profile event".to_string());
        }
        if self.requester_profile.preferences.is_none() {
            return Err("Missing preferences in profile event".to_string());
        }
        Ok(())
    }
}

/// Response returned to the dispatcher.
///
/// `rebuilt` distinguishes "no rebuild attempted" (trigger off) from
/// "rebuilt to an empty match set", both of which report zero matches.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchmakingResponse {
    pub success: bool,
    pub matches_written: usize,
    pub rebuilt: bool,
    pub message: String,
}

impl MatchmakingResponse {
    pub fn skipped() -> Self {
        Self {
            success: true,
            matches_written: 0,
            rebuilt: false,
            message: "Matchmaking not requested; existing matches left untouched".to_string(),
        }
    }

    pub fn rebuilt(matches_written: usize) -> Self {
        Self {
            success: true,
            matches_written,
            rebuilt: true,
            message: format!("Match set rebuilt with {} match(es)", matches_written),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_event() {
        let json = r#"
        {
            "requesterId": "user-1",
            "requesterProfile": {
                "age": 28,
                "gender": "Male",
                "location": "Austin",
                "interests": ["hiking", "travel"],
                "values": "family, travel",
                "relationshipGoal": "long-term",
                "preferences": {
                    "ageMin": 25,
                    "ageMax": 35,
                    "gender": "Female",
                    "relationshipGoal": "long-term"
                }
            },
            "triggerMatchmaking": true
        }
        "#;

        let event: ProfileChangeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.requester_id, "user-1");
        assert!(event.trigger_matchmaking);
        assert!(event.validate().is_ok());

        let profile = event.into_profile();
        assert_eq!(profile.user_id, "user-1");
        assert_eq!(profile.preferences.age_min, Some(25));
        assert_eq!(profile.preferences.age_max, Some(35));
        assert_eq!(profile.interests, vec!["hiking", "travel"]);
        assert_eq!(profile.values, "family, travel");
    }

    #[test]
    fn test_trigger_flag_defaults_to_false() {
        let json = r#"
        {
            "requesterId": "user-1",
            "requesterProfile": {}
        }
        "#;

        let event: ProfileChangeEvent = serde_json::from_str(json).unwrap();
        assert!(!event.trigger_matchmaking);
    }

    #[test]
    fn test_missing_requester_id_rejected() {
        let json = r#"
        {
            "requesterId": "  ",
            "requesterProfile": { "preferences": {} },
            "triggerMatchmaking": true
        }
        "#;

        let event: ProfileChangeEvent = serde_json::from_str(json).unwrap();
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_missing_preferences_rejected() {
        let json = r#"
        {
            "requesterId": "user-1",
            "requesterProfile": { "age": 30 },
            "triggerMatchmaking": true
        }
        "#;

        let event: ProfileChangeEvent = serde_json::from_str(json).unwrap();
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_sparse_profile_degrades_to_defaults() {
        let json = r#"
        {
            "requesterId": "user-1",
            "requesterProfile": { "preferences": {} },
            "triggerMatchmaking": true
        }
        "#;

        let event: ProfileChangeEvent = serde_json::from_str(json).unwrap();
        assert!(event.validate().is_ok());
        let profile = event.into_profile();
        assert!(profile.interests.is_empty());
        assert!(profile.values.is_empty());
        assert!(profile.relationship_goal.is_empty());
        assert!(!profile.preferences.has_age_range());
    }

    #[test]
    fn test_response_distinguishes_skip_from_empty_rebuild() {
        let skipped = MatchmakingResponse::skipped();
        let empty = MatchmakingResponse::rebuilt(0);
        assert!(skipped.success && empty.success);
        assert_eq!(skipped.matches_written, 0);
        assert_eq!(empty.matches_written, 0);
        assert!(!skipped.rebuilt);
        assert!(empty.rebuilt);
    }
}
