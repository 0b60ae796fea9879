//! The runner track: obstacles approaching a laterally dodging player.

pub mod logic;
pub mod types;

pub use logic::{clamp_lateral, is_colliding, spawn_obstacle, step_obstacles, ObstacleStep};
pub use types::{Obstacle, ObstacleFate, ObstacleHandle, ObstacleShape, Position};
