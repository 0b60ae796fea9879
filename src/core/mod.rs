//! Core session state, transitions and the tick scheduler.

pub mod constants;
pub mod game_logic;
pub mod game_state;
pub mod tick;

pub use game_logic::{
    apply_event, challenge_input, finalize_run, jump, move_player, next_mode, resolve_challenge,
    LateralDirection, SessionEvent,
};
pub use game_state::{GameSession, RunSummary, SessionMode};
pub use tick::{advance, game_tick, TickEvent, TickResult};
