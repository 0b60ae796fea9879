//! Extra-life puzzle data structures.
//!
//! After a collision the player may answer a banana puzzle ("what number
//! replaces the question mark?") for an extra life. A small number of
//! attempts is allowed; skipping forfeits the life.

use serde::{Deserialize, Serialize};

/// One puzzle. `question` is an image URL for remote puzzles or plain text
/// for generated ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BananaPuzzle {
    pub question: String,
    pub solution: i64,
}

impl BananaPuzzle {
    pub fn is_image(&self) -> bool {
        self.question.starts_with("http://") || self.question.starts_with("https://")
    }
}

/// How the challenge ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeResult {
    Solved,
    /// Every attempt was used on a wrong answer.
    Failed,
    Skipped,
}

impl ChallengeResult {
    pub fn grants_life(&self) -> bool {
        matches!(self, Self::Solved)
    }
}

/// Full challenge state.
#[derive(Debug, Clone)]
pub struct ExtraLifeChallenge {
    /// `None` while the puzzle is still being fetched.
    pub puzzle: Option<BananaPuzzle>,
    pub load_error: Option<String>,
    pub answer_input: String,
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub message: Option<String>,
    pub result: Option<ChallengeResult>,
}

impl ExtraLifeChallenge {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            puzzle: None,
            load_error: None,
            answer_input: String::new(),
            attempts_used: 0,
            max_attempts: max_attempts.max(1),
            message: None,
            result: None,
        }
    }

    pub fn with_puzzle(max_attempts: u32, puzzle: BananaPuzzle) -> Self {
        let mut challenge = Self::new(max_attempts);
        challenge.set_puzzle(puzzle);
        challenge
    }

    pub fn set_puzzle(&mut self, puzzle: BananaPuzzle) {
        self.puzzle = Some(puzzle);
        self.load_error = None;
    }

    pub fn set_load_error(&mut self, error: String) {
        if self.puzzle.is_none() {
            self.load_error = Some(error);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.puzzle.is_none() && self.load_error.is_none()
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts_used)
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }
}
