use super::{ProfileBackend, SyncError};
use crate::accounts::{
    AccountStore, AuthSession, LeaderboardEntry, ProfileUpdate, ScoreEntry, ScoreReceipt,
    UserProfile,
};
use crate::progression::{Tier, UnlockState};
use std::path::Path;

/// Accounts kept on this machine, for offline play.
pub struct LocalAccounts {
    store: AccountStore,
}

impl LocalAccounts {
    pub fn new(store: AccountStore) -> Self {
        Self { store }
    }

    pub fn open(path: &Path) -> Result<Self, SyncError> {
        Ok(Self::new(AccountStore::open(path)?))
    }

    pub fn open_default() -> Result<Self, SyncError> {
        Ok(Self::new(AccountStore::open_default()?))
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }
}

impl ProfileBackend for LocalAccounts {
    fn name(&self) -> &'static str {
        "local"
    }

    fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SyncError> {
        Ok(self.store.register(username, email, password)?)
    }

    fn login(&self, username: &str, password: &str) -> Result<AuthSession, SyncError> {
        Ok(self.store.login(username, password)?)
    }

    fn profile(&self, token: &str) -> Result<UserProfile, SyncError> {
        Ok(self.store.profile(token)?)
    }

    fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, SyncError> {
        Ok(self.store.update_profile(token, update)?)
    }

    fn submit_score(
        &self,
        token: &str,
        score: u64,
        character: Tier,
    ) -> Result<ScoreReceipt, SyncError> {
        Ok(self.store.save_score(token, score, character)?)
    }

    fn user_scores(&self, token: &str) -> Result<Vec<ScoreEntry>, SyncError> {
        Ok(self.store.user_scores(token)?)
    }

    fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, SyncError> {
        Ok(self.store.leaderboard()?)
    }

    fn unlock_character(&self, token: &str, tier: Tier) -> Result<UnlockState, SyncError> {
        Ok(self.store.unlock_character(token, tier)?)
    }

    fn select_character(&self, token: &str, tier: Tier) -> Result<Tier, SyncError> {
        Ok(self.store.select_character(token, tier)?)
    }
}
