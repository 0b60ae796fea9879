//! Simulation configuration.

use crate::config::RunnerConfig;

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of sessions to play
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Simulation ticks per run before giving up
    pub max_ticks_per_run: u64,

    /// Dodge approaching obstacles instead of running straight
    pub autopilot: bool,

    /// Chance of answering an extra-life puzzle correctly on each attempt
    pub puzzle_success_rate: f64,

    /// Gameplay tuning under test
    pub runner: RunnerConfig,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per run)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 100,
            seed: None,
            // Ten simulated minutes at 16ms per tick
            max_ticks_per_run: 37_500,
            autopilot: true,
            puzzle_success_rate: 0.5,
            runner: RunnerConfig::default(),
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Quick config for checking the unlock pacing
    pub fn quick(seed: u64) -> Self {
        Self {
            num_runs: 10,
            seed: Some(seed),
            max_ticks_per_run: 12_000,
            ..Default::default()
        }
    }
}
