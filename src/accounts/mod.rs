//! Player accounts: registration, login, profiles, scores and the
//! leaderboard, kept in a local JSON document.

pub mod password;
pub mod store;
pub mod types;

pub use store::{AccountStore, ACCOUNTS_FILENAME};
pub use types::{
    AccountError, AuthSession, LeaderboardEntry, ProfileUpdate, ScoreEntry, ScoreReceipt,
    UserProfile,
};
