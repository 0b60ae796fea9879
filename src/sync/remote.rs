//! HTTP client for the account API.
//!
//! Routes live under `<api_url>/auth/*` and `<api_url>/scores/*`. Protected
//! routes take a bearer token; errors come back as `{"message": "..."}`.

use super::{ProfileBackend, SyncError};
use crate::accounts::{
    AuthSession, LeaderboardEntry, ProfileUpdate, ScoreEntry, ScoreReceipt, UserProfile,
};
use crate::progression::{Tier, UnlockState};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct SavedScore {
    user: ScoreReceipt,
}

#[derive(Deserialize)]
struct ScoreOwner {
    username: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedScore {
    score: u64,
    #[serde(default)]
    character_color: Tier,
    date: DateTime<Utc>,
    user: Option<ScoreOwner>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnlockResponse {
    unlocked_characters: UnlockState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectResponse {
    selected_character: Tier,
}

pub struct RemoteApi {
    base_url: String,
    agent: ureq::Agent,
}

impl RemoteApi {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: &str, path: &str, token: Option<&str>) -> ureq::Request {
        let url = format!("{}{}", self.base_url, path);
        debug!(method, %url, "api request");
        let request = self
            .agent
            .request(method, &url)
            .set("User-Agent", "banana-runner");
        match token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    fn send<T: DeserializeOwned>(
        request: ureq::Request,
        body: Option<serde_json::Value>,
    ) -> Result<T, SyncError> {
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        match result {
            Ok(response) => Ok(response.into_json()?),
            Err(ureq::Error::Status(status, response)) => {
                let message = response
                    .into_json::<ErrorBody>()
                    .map(|b| b.message)
                    .unwrap_or_else(|_| "Server error".to_string());
                Err(SyncError::Rejected { status, message })
            }
            Err(e) => Err(SyncError::Transport(e.to_string())),
        }
    }
}

impl ProfileBackend for RemoteApi {
    fn name(&self) -> &'static str {
        "online"
    }

    fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SyncError> {
        Self::send(
            self.request("POST", "/auth/register", None),
            Some(json!({ "username": username, "email": email, "password": password })),
        )
    }

    fn login(&self, username: &str, password: &str) -> Result<AuthSession, SyncError> {
        Self::send(
            self.request("POST", "/auth/login", None),
            Some(json!({ "username": username, "password": password })),
        )
    }

    fn profile(&self, token: &str) -> Result<UserProfile, SyncError> {
        Self::send(self.request("GET", "/auth/profile", Some(token)), None)
    }

    fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, SyncError> {
        let body = serde_json::to_value(update).map_err(|e| SyncError::Decode(e.into()))?;
        Self::send(self.request("PUT", "/auth/profile", Some(token)), Some(body))
    }

    fn submit_score(
        &self,
        token: &str,
        score: u64,
        character: Tier,
    ) -> Result<ScoreReceipt, SyncError> {
        let saved: SavedScore = Self::send(
            self.request("POST", "/scores", Some(token)),
            Some(json!({ "score": score, "characterColor": character })),
        )?;
        Ok(saved.user)
    }

    fn user_scores(&self, token: &str) -> Result<Vec<ScoreEntry>, SyncError> {
        Self::send(self.request("GET", "/scores", Some(token)), None)
    }

    fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, SyncError> {
        let ranked: Vec<RankedScore> =
            Self::send(self.request("GET", "/scores/leaderboard", None), None)?;
        Ok(ranked
            .into_iter()
            .map(|r| LeaderboardEntry {
                username: r
                    .user
                    .map(|u| u.username)
                    .unwrap_or_else(|| "unknown".to_string()),
                score: r.score,
                character_color: r.character_color,
                date: r.date,
            })
            .collect())
    }

    fn unlock_character(&self, token: &str, tier: Tier) -> Result<UnlockState, SyncError> {
        let response: UnlockResponse = Self::send(
            self.request("PUT", "/scores/unlock-character", Some(token)),
            Some(json!({ "characterColor": tier })),
        )?;
        Ok(response.unlocked_characters)
    }

    fn select_character(&self, token: &str, tier: Tier) -> Result<Tier, SyncError> {
        let response: SelectResponse = Self::send(
            self.request("PUT", "/scores/select-character", Some(token)),
            Some(json!({ "characterColor": tier })),
        )?;
        Ok(response.selected_character)
    }
}
