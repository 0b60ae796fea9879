//! Headless balance simulator.
//!
//! Plays many sessions through the real tick scheduler with a simple
//! autopilot and reports how far runs get: scores, collisions, extra lives
//! and which character tiers were reached.

mod autopilot;
mod config;
mod report;
mod runner;

pub use autopilot::autopilot_steer;
pub use config::SimConfig;
pub use report::{RunStats, SimReport};
pub use runner::{run_simulation, simulate_single_run};
