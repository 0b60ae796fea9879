use crate::challenges::ExtraLifeChallenge;
use crate::config::RunnerConfig;
use crate::core::constants::{
    MESSAGE_LOG_CAPACITY, PLAYER_START_X, PLAYER_START_Y, PLAYER_START_Z,
};
use crate::progression::{check_selection, SelectionError, Tier, UnlockState};
use crate::runner::{Obstacle, Position};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    /// Waiting for the player to start.
    Idle,
    Running,
    /// Death cue playing; spawning, movement and scoring are frozen.
    Collided,
    MiniGameForExtraLife,
    GameOver,
}

impl SessionMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Collided => "Collided",
            Self::MiniGameForExtraLife => "Extra Life",
            Self::GameOver => "Game Over",
        }
    }
}

/// What a finished run hands to progression and score sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub character: Tier,
    /// High score after this run.
    pub high_score: u64,
    pub new_high_score: bool,
    pub extra_lives_used: u32,
    pub ticks: u64,
}

/// One play session: the current run plus what carries across restarts.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub mode: SessionMode,
    pub score: u64,
    /// Best score known to this session, including the current run.
    pub high_score: u64,
    /// High score when the current run started.
    pub starting_high_score: u64,
    pub unlocks: UnlockState,
    pub character: Tier,
    pub obstacles: Vec<Obstacle>,
    pub next_obstacle_id: u64,
    pub score_timer_ms: u64,
    pub spawn_timer_ms: u64,
    pub accumulated_time_ms: u64,
    /// Ticks stepped while running in the current run.
    pub tick_count: u64,
    pub cue_remaining_ms: u64,
    pub jump_remaining_ms: u64,
    pub extra_lives_used: u32,
    pub active_challenge: Option<ExtraLifeChallenge>,
    pub start_position: Position,
    /// True once the current run's result has been handed off.
    pub run_finalized: bool,
    pub messages: VecDeque<String>,
    pub config: RunnerConfig,
}

impl GameSession {
    pub fn new(
        config: RunnerConfig,
        high_score: u64,
        unlocks: UnlockState,
        character: Tier,
    ) -> Self {
        let mut unlocks = unlocks;
        unlocks.absorb_high_score(high_score);
        let character = if unlocks.is_unlocked(character) {
            character
        } else {
            Tier::DEFAULT
        };

        Self {
            mode: SessionMode::Idle,
            score: 0,
            high_score,
            starting_high_score: high_score,
            unlocks,
            character,
            obstacles: Vec::new(),
            next_obstacle_id: 1,
            score_timer_ms: 0,
            spawn_timer_ms: 0,
            accumulated_time_ms: 0,
            tick_count: 0,
            cue_remaining_ms: 0,
            jump_remaining_ms: 0,
            extra_lives_used: 0,
            active_challenge: None,
            start_position: Position::new(PLAYER_START_X, PLAYER_START_Y, PLAYER_START_Z),
            run_finalized: true,
            messages: VecDeque::new(),
            config,
        }
    }

    /// Fresh session for a player with no history.
    pub fn fresh(config: RunnerConfig) -> Self {
        Self::new(config, 0, UnlockState::default(), Tier::DEFAULT)
    }

    /// Change the runner color. Locked tiers are rejected and nothing changes.
    pub fn set_character(&mut self, tier: Tier) -> Result<Tier, SelectionError> {
        if !self.unlocks.is_unlocked(tier) {
            check_selection(self.high_score, tier)?;
        }
        self.character = tier;
        Ok(tier)
    }

    pub fn is_running(&self) -> bool {
        self.mode == SessionMode::Running
    }

    /// Push a line to the in-game message log, newest first.
    pub fn add_message(&mut self, message: impl Into<String>) {
        if self.messages.len() >= MESSAGE_LOG_CAPACITY {
            self.messages.pop_back();
        }
        self.messages.push_front(message.into());
    }

    pub(crate) fn next_id(&mut self) -> u64 {
        let id = self.next_obstacle_id;
        self.next_obstacle_id += 1;
        id
    }
}
