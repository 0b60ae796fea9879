//! Runtime configuration.
//!
//! Loaded from `~/.banana-runner/config.json`, falling back to the
//! compiled-in constants for anything missing. The API and puzzle endpoints
//! can also be overridden from the environment.

use crate::core::constants::*;
use crate::utils::persistence::load_json_or_default;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "config.json";
pub const API_URL_ENV: &str = "BANANA_RUNNER_API_URL";
pub const PUZZLE_URL_ENV: &str = "BANANA_RUNNER_PUZZLE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Milliseconds between obstacle spawns while running.
    pub spawn_interval_ms: u64,
    /// Milliseconds of running per score point.
    pub score_interval_ms: u64,
    /// How long the death cue plays before the puzzle is offered.
    pub collision_cue_ms: u64,
    /// Forward distance covered by each obstacle per tick.
    pub obstacle_speed: f64,
    pub spawn_distance: f64,
    pub despawn_distance: f64,
    pub obstacle_height: f64,
    pub lane_half_width: f64,
    pub lateral_step: f64,
    pub collision_radius: f64,
    pub max_puzzle_attempts: u32,
    pub api_url: String,
    pub puzzle_url: String,
    /// Skip the remote API and keep accounts in the local store.
    pub offline: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            score_interval_ms: SCORE_INTERVAL_MS,
            collision_cue_ms: COLLISION_CUE_MS,
            obstacle_speed: OBSTACLE_SPEED,
            spawn_distance: SPAWN_DISTANCE,
            despawn_distance: DESPAWN_DISTANCE,
            obstacle_height: OBSTACLE_REST_HEIGHT,
            lane_half_width: LANE_HALF_WIDTH,
            lateral_step: LATERAL_STEP,
            collision_radius: COLLISION_RADIUS,
            max_puzzle_attempts: MAX_PUZZLE_ATTEMPTS,
            api_url: DEFAULT_API_URL.to_string(),
            puzzle_url: DEFAULT_PUZZLE_URL.to_string(),
            offline: false,
        }
    }
}

impl RunnerConfig {
    /// Read the config file (or defaults) and apply environment overrides.
    pub fn load() -> Self {
        let mut config: RunnerConfig = load_json_or_default(CONFIG_FILENAME);
        config.apply_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(PUZZLE_URL_ENV).ok(),
        );
        config.sanitized()
    }

    pub fn apply_overrides(&mut self, api_url: Option<String>, puzzle_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(url) = puzzle_url.filter(|u| !u.trim().is_empty()) {
            self.puzzle_url = url.trim().to_string();
        }
    }

    /// Replace values that would stall or break the loop with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = RunnerConfig::default();
        if self.spawn_interval_ms == 0 {
            self.spawn_interval_ms = defaults.spawn_interval_ms;
        }
        if self.score_interval_ms == 0 {
            self.score_interval_ms = defaults.score_interval_ms;
        }
        if !(self.obstacle_speed.is_finite() && self.obstacle_speed > 0.0) {
            self.obstacle_speed = defaults.obstacle_speed;
        }
        if !(self.collision_radius.is_finite() && self.collision_radius > 0.0) {
            self.collision_radius = defaults.collision_radius;
        }
        if !(self.lane_half_width.is_finite() && self.lane_half_width >= 0.0) {
            self.lane_half_width = defaults.lane_half_width;
        }
        if !(self.lateral_step.is_finite() && self.lateral_step > 0.0) {
            self.lateral_step = defaults.lateral_step;
        }
        if !self.spawn_distance.is_finite() {
            self.spawn_distance = defaults.spawn_distance;
        }
        if !(self.despawn_distance.is_finite() && self.despawn_distance < self.spawn_distance) {
            self.despawn_distance = defaults.despawn_distance.min(self.spawn_distance - 1.0);
        }
        if !self.obstacle_height.is_finite() {
            self.obstacle_height = defaults.obstacle_height;
        }
        if self.max_puzzle_attempts == 0 {
            self.max_puzzle_attempts = defaults.max_puzzle_attempts;
        }
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        self
    }

    /// Ticks an obstacle needs to travel from the spawn line past the despawn line.
    pub fn ticks_to_clear_track(&self) -> u64 {
        ((self.spawn_distance - self.despawn_distance) / self.obstacle_speed).ceil() as u64 + 1
    }
}
