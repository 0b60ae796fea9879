//! Score and profile sync.
//!
//! Finished runs are handed to [`ScoreSync`], which talks to a
//! [`ProfileBackend`] (the remote account API or the local account store)
//! on a background thread and falls back to [`LocalCache`] when the
//! backend is unreachable or nobody is logged in.

pub mod cache;
pub mod local;
pub mod remote;
pub mod score_sync;

pub use cache::{LocalCache, PendingScore, CACHE_FILENAME};
pub use local::LocalAccounts;
pub use remote::RemoteApi;
pub use score_sync::{ScoreSync, SyncOutcome};

use crate::accounts::{
    AccountError, AuthSession, LeaderboardEntry, ProfileUpdate, ScoreEntry, ScoreReceipt,
    UserProfile,
};
use crate::config::RunnerConfig;
use crate::core::constants::HTTP_TIMEOUT_SECONDS;
use crate::progression::{Tier, UnlockState};
use std::io;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("could not reach the server: {0}")]
    Transport(String),
    #[error("unexpected server response: {0}")]
    Decode(#[from] io::Error),
}

impl SyncError {
    /// True if retrying later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Account(AccountError::Storage(_)) => true,
            _ => false,
        }
    }
}

/// Who the current player is. Passed explicitly to everything that needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionContext {
    #[default]
    Anonymous,
    Authenticated(AuthSession),
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated(session) => Some(&session.token),
            Self::Anonymous => None,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(session) => Some(&session.profile),
            Self::Anonymous => None,
        }
    }

    pub fn profile_mut(&mut self) -> Option<&mut UserProfile> {
        match self {
            Self::Authenticated(session) => Some(&mut session.profile),
            Self::Anonymous => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.profile().map(|p| p.username.as_str())
    }
}

/// Account operations, wherever the accounts live.
pub trait ProfileBackend: Send + Sync {
    /// Short label for logs and the status bar.
    fn name(&self) -> &'static str;

    fn register(&self, username: &str, email: &str, password: &str)
        -> Result<AuthSession, SyncError>;

    fn login(&self, username: &str, password: &str) -> Result<AuthSession, SyncError>;

    fn profile(&self, token: &str) -> Result<UserProfile, SyncError>;

    fn update_profile(&self, token: &str, update: &ProfileUpdate)
        -> Result<UserProfile, SyncError>;

    fn submit_score(&self, token: &str, score: u64, character: Tier)
        -> Result<ScoreReceipt, SyncError>;

    fn user_scores(&self, token: &str) -> Result<Vec<ScoreEntry>, SyncError>;

    fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, SyncError>;

    fn unlock_character(&self, token: &str, tier: Tier) -> Result<UnlockState, SyncError>;

    fn select_character(&self, token: &str, tier: Tier) -> Result<Tier, SyncError>;
}

/// The backend a configuration asks for.
pub fn connect(config: &RunnerConfig) -> Result<Arc<dyn ProfileBackend>, SyncError> {
    if config.offline {
        Ok(Arc::new(LocalAccounts::open_default()?))
    } else {
        Ok(Arc::new(RemoteApi::new(&config.api_url, HTTP_TIMEOUT_SECONDS)))
    }
}
