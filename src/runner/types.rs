//! Track data structures: positions and obstacles.
//!
//! The player stands at a fixed forward position while obstacles scroll in
//! from `SPAWN_DISTANCE` and leave past `DESPAWN_DISTANCE`. Lateral position
//! is `x`, height is `y`, forward distance is `z`.

use serde::{Deserialize, Serialize};

/// A point on the track in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Obstacle shapes. Both are 2x2x2 units; they differ only in rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleShape {
    Cylinder,
    Block,
}

impl ObstacleShape {
    pub const ALL: [ObstacleShape; 2] = [ObstacleShape::Cylinder, ObstacleShape::Block];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cylinder => "cylinder",
            Self::Block => "block",
        }
    }

    /// Glyph used by the terminal view.
    pub fn glyph(&self) -> char {
        match self {
            Self::Cylinder => '●',
            Self::Block => '■',
        }
    }
}

/// Opaque id handed out by the scene for a spawned obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObstacleHandle(pub u64);

/// A live obstacle. Being present in the session's list means alive.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u64,
    pub shape: ObstacleShape,
    pub position: Position,
    /// Scene handle, set once the scene has accepted the obstacle.
    pub handle: Option<ObstacleHandle>,
}

impl Obstacle {
    pub fn new(id: u64, shape: ObstacleShape, position: Position) -> Self {
        Self {
            id,
            shape,
            position,
            handle: None,
        }
    }
}

/// Why an obstacle left the live set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleFate {
    Passed,
    Collided,
}
