//! Local score cache.
//!
//! Anonymous players keep their high score and unlocks here. A logged-in
//! player's last known profile is mirrored inside the remembered session,
//! apart from the guest progress, along with any scores the backend could
//! not take yet.

use crate::accounts::{AuthSession, ScoreReceipt, UserProfile};
use crate::progression::{Tier, UnlockState};
use crate::utils::persistence::{load_json_file_or_default, save_json_file};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

pub const CACHE_FILENAME: &str = "local-cache.json";

/// A score waiting to be submitted for `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingScore {
    pub username: String,
    pub score: u64,
    pub character_color: Tier,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCache {
    /// Guest progress. Logging in or out never touches these.
    #[serde(default)]
    pub high_score: u64,
    #[serde(default)]
    pub unlocked_characters: UnlockState,
    #[serde(default)]
    pub selected_character: Tier,
    #[serde(default)]
    pub pending: Vec<PendingScore>,
    /// Remembered login, restored on the next launch. Its profile is the
    /// mirror of the account's progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<AuthSession>,
}

impl LocalCache {
    pub fn load(path: &Path) -> Self {
        load_json_file_or_default(path)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        save_json_file(path, self)
    }

    /// Apply a run locally. Returns the tiers it unlocked.
    pub fn record_score(&mut self, score: u64) -> Vec<Tier> {
        if score > self.high_score {
            self.high_score = score;
        }
        self.unlocked_characters.absorb_high_score(self.high_score)
    }

    /// Mirrored profile of the remembered login, if it belongs to `username`.
    pub fn profile_mut(&mut self, username: &str) -> Option<&mut UserProfile> {
        self.session
            .as_mut()
            .map(|session| &mut session.profile)
            .filter(|profile| profile.username == username)
    }

    /// Fold a backend receipt into `username`'s mirrored profile.
    pub fn absorb_receipt(&mut self, username: &str, receipt: &ScoreReceipt) {
        if let Some(profile) = self.profile_mut(username) {
            profile.high_score = profile.high_score.max(receipt.high_score);
            profile.unlocked_characters.merge(&receipt.unlocked_characters);
            profile.unlocked_characters.absorb_high_score(profile.high_score);
        }
    }

    /// Apply a run the backend has not seen yet to `username`'s mirror.
    pub fn record_pending_score(&mut self, username: &str, score: u64) {
        if let Some(profile) = self.profile_mut(username) {
            profile.high_score = profile.high_score.max(score);
            profile.unlocked_characters.absorb_high_score(profile.high_score);
        }
    }

    pub fn queue(&mut self, pending: PendingScore) {
        self.pending.push(pending);
    }

    /// Remove and return every pending score belonging to `username`.
    pub fn take_pending_for(&mut self, username: &str) -> Vec<PendingScore> {
        let (mine, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.username == username);
        self.pending = rest;
        mine
    }

    pub fn pending_for(&self, username: &str) -> usize {
        self.pending.iter().filter(|p| p.username == username).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::persistence::test_dir;

    fn pending(username: &str, score: u64) -> PendingScore {
        PendingScore {
            username: username.to_string(),
            score,
            character_color: Tier::Yellow,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_score_keeps_max() {
        let mut cache = LocalCache::default();
        assert_eq!(cache.record_score(60), vec![Tier::Green]);
        assert!(cache.record_score(20).is_empty());
        assert_eq!(cache.high_score, 60);
        assert_eq!(cache.record_score(151), vec![Tier::Blue, Tier::Red]);
    }

    fn login(username: &str, high_score: u64) -> AuthSession {
        AuthSession {
            token: "t".to_string(),
            profile: UserProfile {
                id: "u".to_string(),
                username: username.to_string(),
                email: String::new(),
                high_score,
                selected_character: Tier::Yellow,
                unlocked_characters: UnlockState::for_high_score(high_score),
            },
        }
    }

    #[test]
    fn test_absorb_receipt_never_downgrades() {
        let mut cache = LocalCache::default();
        cache.session = Some(login("kong", 120));
        cache.absorb_receipt(
            "kong",
            &ScoreReceipt {
                high_score: 30,
                unlocked_characters: UnlockState::default(),
            },
        );
        let profile = &cache.session.as_ref().unwrap().profile;
        assert_eq!(profile.high_score, 120);
        assert!(profile.unlocked_characters.blue);
    }

    #[test]
    fn test_account_progress_stays_out_of_guest_fields() {
        let mut cache = LocalCache::default();
        cache.record_score(20);
        cache.session = Some(login("kong", 0));

        cache.absorb_receipt(
            "kong",
            &ScoreReceipt {
                high_score: 160,
                unlocked_characters: UnlockState::for_high_score(160),
            },
        );
        cache.record_pending_score("kong", 170);
        // Another user's late result is not mirrored.
        cache.record_pending_score("diddy", 500);

        let profile = &cache.session.as_ref().unwrap().profile;
        assert_eq!(profile.high_score, 170);
        assert!(profile.unlocked_characters.red);
        assert_eq!(cache.high_score, 20);
        assert!(cache.unlocked_characters.green);
        assert!(!cache.unlocked_characters.blue);
    }

    #[test]
    fn test_take_pending_for_user() {
        let mut cache = LocalCache::default();
        cache.queue(pending("kong", 1));
        cache.queue(pending("diddy", 2));
        cache.queue(pending("kong", 3));
        let mine = cache.take_pending_for("kong");
        assert_eq!(mine.iter().map(|p| p.score).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(cache.pending.len(), 1);
        assert_eq!(cache.pending_for("diddy"), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = test_dir("cache-roundtrip");
        let path = dir.join(CACHE_FILENAME);
        let mut cache = LocalCache::default();
        cache.record_score(77);
        cache.queue(pending("kong", 9));
        cache.save(&path).unwrap();

        let loaded = LocalCache::load(&path);
        assert_eq!(loaded, cache);
        std::fs::remove_dir_all(&dir).ok();
    }
}
