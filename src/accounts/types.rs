//! Account records as they travel over the wire and sit in the store.
//!
//! Field names follow the JSON the account API speaks (`_id`,
//! `highScore`, `unlockedCharacters`, ...).

use crate::progression::{SelectionError, Tier, UnlockState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("User already exists")]
    UserExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Not authorized, token failed")]
    NotAuthorized,
    #[error("User not found")]
    UserNotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("account storage failed: {0}")]
    Storage(#[from] io::Error),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub high_score: u64,
    #[serde(default)]
    pub selected_character: Tier,
    #[serde(default)]
    pub unlocked_characters: UnlockState,
}

impl UserProfile {
    pub fn can_select(&self, tier: Tier) -> bool {
        self.unlocked_characters.is_unlocked(tier)
    }
}

/// A logged-in user: bearer token plus the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// What a score submission reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReceipt {
    pub high_score: u64,
    pub unlocked_characters: UnlockState,
}

/// One of the caller's own scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub score: u64,
    #[serde(default)]
    pub character_color: Tier,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u64,
    #[serde(default)]
    pub character_color: Tier,
    pub date: DateTime<Utc>,
}

/// Partial profile update. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_character: Option<Tier>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.selected_character.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_session_flat_wire_format() {
        let json = r#"{
            "_id": "u1",
            "username": "kong",
            "email": "kong@example.test",
            "highScore": 75,
            "unlockedCharacters": {"green": true, "blue": false, "red": false},
            "selectedCharacter": "green",
            "token": "abc"
        }"#;
        let session: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.profile.high_score, 75);
        assert_eq!(session.profile.selected_character, Tier::Green);
        assert!(session.profile.can_select(Tier::Green));
        assert!(!session.profile.can_select(Tier::Blue));
    }

    #[test]
    fn test_profile_missing_fields_default() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"_id": "u2", "username": "diddy"}"#).unwrap();
        assert_eq!(profile.high_score, 0);
        assert_eq!(profile.selected_character, Tier::Yellow);
        assert_eq!(profile.unlocked_characters, UnlockState::default());
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            selected_character: Some(Tier::Blue),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"selectedCharacter":"blue"}"#);
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_locked_selection_message_names_threshold() {
        let err = AccountError::from(SelectionError::Locked {
            tier: Tier::Red,
            required: 150,
        });
        assert!(err.to_string().contains("150"));
    }
}
