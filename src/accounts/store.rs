//! Local account store backed by a single JSON document.
//!
//! Holds users, their scores and the issued bearer tokens. Every mutating
//! call rewrites the document before returning.

use super::password::{
    hash_password, validate_email, validate_password, validate_username, verify_password,
};
use super::types::{
    AccountError, AuthSession, LeaderboardEntry, ProfileUpdate, ScoreEntry, ScoreReceipt,
    UserProfile,
};
use crate::core::constants::{LEADERBOARD_SIZE, TOKEN_TTL_DAYS};
use crate::progression::{check_selection, SelectionError, Tier, UnlockState};
use crate::utils::persistence::{data_path, load_json_file, save_json_file};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

pub const ACCOUNTS_FILENAME: &str = "accounts.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    profile: UserProfile,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredScore {
    user_id: String,
    score: u64,
    character_color: Tier,
    date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    user_id: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AccountData {
    #[serde(default)]
    users: Vec<StoredUser>,
    #[serde(default)]
    scores: Vec<StoredScore>,
    #[serde(default)]
    tokens: Vec<StoredToken>,
}

impl AccountData {
    fn user_index(&self, token: &str, now: DateTime<Utc>) -> Result<usize, AccountError> {
        let user_id = self
            .tokens
            .iter()
            .find(|t| t.token == token && t.expires_at > now)
            .map(|t| t.user_id.as_str())
            .ok_or(AccountError::NotAuthorized)?;
        self.users
            .iter()
            .position(|u| u.profile.id == user_id)
            .ok_or(AccountError::UserNotFound)
    }

    fn issue_token(&mut self, user_id: &str, now: DateTime<Utc>) -> String {
        self.tokens.retain(|t| t.expires_at > now);
        let token = Uuid::new_v4().to_string();
        self.tokens.push(StoredToken {
            token: token.clone(),
            user_id: user_id.to_string(),
            expires_at: now + Duration::days(TOKEN_TTL_DAYS),
        });
        token
    }

    fn email_taken(&self, email: &str, except_id: Option<&str>) -> bool {
        self.users.iter().any(|u| {
            Some(u.profile.id.as_str()) != except_id
                && u.profile.email.eq_ignore_ascii_case(email)
        })
    }
}

/// Sort best first; equal scores keep the earliest date first.
fn rank_scores(scores: &mut [&StoredScore]) {
    scores.sort_by(|a, b| b.score.cmp(&a.score).then(a.date.cmp(&b.date)));
}

pub struct AccountStore {
    path: PathBuf,
    data: Mutex<AccountData>,
}

impl AccountStore {
    /// Open (or start) the store at `path`. A malformed file is an error.
    pub fn open(path: &Path) -> Result<Self, AccountError> {
        let data: AccountData = load_json_file(path)?.unwrap_or_default();
        debug!(path = %path.display(), users = data.users.len(), "account store opened");
        Ok(Self {
            path: path.to_path_buf(),
            data: Mutex::new(data),
        })
    }

    /// Open ~/.banana-runner/accounts.json.
    pub fn open_default() -> Result<Self, AccountError> {
        let path = data_path(ACCOUNTS_FILENAME)?;
        Self::open(&path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, AccountData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, data: &AccountData) -> Result<(), AccountError> {
        save_json_file(&self.path, data)?;
        Ok(())
    }

    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AccountError> {
        let username = username.trim();
        let email = email.trim();
        validate_username(username)?;
        validate_email(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let mut data = self.lock();
        let taken = data
            .users
            .iter()
            .any(|u| u.profile.username.eq_ignore_ascii_case(username));
        if taken || data.email_taken(email, None) {
            return Err(AccountError::UserExists);
        }

        let now = Utc::now();
        let profile = UserProfile {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            high_score: 0,
            selected_character: Tier::DEFAULT,
            unlocked_characters: UnlockState::default(),
        };
        data.users.push(StoredUser {
            profile: profile.clone(),
            password_hash,
            created_at: now,
        });
        let token = data.issue_token(&profile.id, now);
        self.persist(&data)?;

        info!(username = %profile.username, "account registered");
        Ok(AuthSession { token, profile })
    }

    pub fn login(&self, username: &str, password: &str) -> Result<AuthSession, AccountError> {
        let mut data = self.lock();
        let user = data
            .users
            .iter()
            .find(|u| u.profile.username.eq_ignore_ascii_case(username.trim()))
            .ok_or(AccountError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash) {
            return Err(AccountError::InvalidCredentials);
        }

        let profile = user.profile.clone();
        let token = data.issue_token(&profile.id, Utc::now());
        self.persist(&data)?;

        info!(username = %profile.username, "logged in");
        Ok(AuthSession { token, profile })
    }

    /// Revoke a token. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) -> Result<(), AccountError> {
        let mut data = self.lock();
        let before = data.tokens.len();
        data.tokens.retain(|t| t.token != token);
        if data.tokens.len() != before {
            self.persist(&data)?;
        }
        Ok(())
    }

    pub fn profile(&self, token: &str) -> Result<UserProfile, AccountError> {
        let data = self.lock();
        let index = data.user_index(token, Utc::now())?;
        Ok(data.users[index].profile.clone())
    }

    pub fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AccountError> {
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        let password_hash = match &update.password {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let mut data = self.lock();
        let index = data.user_index(token, Utc::now())?;

        if let Some(email) = &update.email {
            let email = email.trim();
            if data.email_taken(email, Some(&data.users[index].profile.id)) {
                return Err(AccountError::UserExists);
            }
        }
        if let Some(tier) = update.selected_character {
            let profile = &data.users[index].profile;
            if !profile.can_select(tier) {
                check_selection(profile.high_score, tier)?;
            }
        }

        let user = &mut data.users[index];
        if let Some(email) = &update.email {
            user.profile.email = email.trim().to_string();
        }
        if let Some(password_hash) = password_hash {
            user.password_hash = password_hash;
        }
        if let Some(tier) = update.selected_character {
            user.profile.selected_character = tier;
        }
        let profile = user.profile.clone();
        self.persist(&data)?;
        Ok(profile)
    }

    /// Record a finished run. Raises the high score if beaten and unlocks
    /// every tier it qualifies for.
    pub fn save_score(
        &self,
        token: &str,
        score: u64,
        character: Tier,
    ) -> Result<ScoreReceipt, AccountError> {
        let mut data = self.lock();
        let now = Utc::now();
        let index = data.user_index(token, now)?;
        let user_id = data.users[index].profile.id.clone();

        data.scores.push(StoredScore {
            user_id,
            score,
            character_color: character,
            date: now,
        });

        let profile = &mut data.users[index].profile;
        if score > profile.high_score {
            profile.high_score = score;
        }
        let high_score = profile.high_score;
        let newly = profile.unlocked_characters.absorb_high_score(high_score);
        let receipt = ScoreReceipt {
            high_score,
            unlocked_characters: profile.unlocked_characters,
        };
        let username = profile.username.clone();
        self.persist(&data)?;

        info!(%username, score, high_score, unlocked = newly.len(), "score saved");
        Ok(receipt)
    }

    /// The caller's best scores, best first.
    pub fn user_scores(&self, token: &str) -> Result<Vec<ScoreEntry>, AccountError> {
        let data = self.lock();
        let index = data.user_index(token, Utc::now())?;
        let user_id = &data.users[index].profile.id;

        let mut scores: Vec<&StoredScore> =
            data.scores.iter().filter(|s| &s.user_id == user_id).collect();
        rank_scores(&mut scores);
        Ok(scores
            .into_iter()
            .take(LEADERBOARD_SIZE)
            .map(|s| ScoreEntry {
                score: s.score,
                character_color: s.character_color,
                date: s.date,
            })
            .collect())
    }

    /// Best scores across every user.
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, AccountError> {
        let data = self.lock();
        let mut scores: Vec<&StoredScore> = data.scores.iter().collect();
        rank_scores(&mut scores);

        Ok(scores
            .into_iter()
            .filter_map(|s| {
                let user = data.users.iter().find(|u| u.profile.id == s.user_id)?;
                Some(LeaderboardEntry {
                    username: user.profile.username.clone(),
                    score: s.score,
                    character_color: s.character_color,
                    date: s.date,
                })
            })
            .take(LEADERBOARD_SIZE)
            .collect())
    }

    /// Explicitly unlock a tier the high score already qualifies for.
    pub fn unlock_character(&self, token: &str, tier: Tier) -> Result<UnlockState, AccountError> {
        if tier == Tier::DEFAULT {
            return Err(SelectionError::InvalidCharacter(tier.key().to_string()).into());
        }

        let mut data = self.lock();
        let index = data.user_index(token, Utc::now())?;
        let profile = &mut data.users[index].profile;
        if profile.high_score < tier.threshold() {
            return Err(SelectionError::Locked {
                tier,
                required: tier.threshold(),
            }
            .into());
        }
        profile.unlocked_characters.unlock(tier);
        let unlocks = profile.unlocked_characters;
        self.persist(&data)?;
        Ok(unlocks)
    }

    pub fn select_character(&self, token: &str, tier: Tier) -> Result<Tier, AccountError> {
        self.update_profile(
            token,
            &ProfileUpdate {
                selected_character: Some(tier),
                ..ProfileUpdate::default()
            },
        )
        .map(|profile| profile.selected_character)
    }

    #[cfg(test)]
    fn expire_all_tokens(&self) {
        let mut data = self.lock();
        for token in &mut data.tokens {
            token.expires_at = Utc::now() - Duration::seconds(1);
        }
    }
}
