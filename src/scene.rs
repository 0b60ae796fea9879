//! The rendering collaborator seen from the gameplay loop.
//!
//! The loop never reaches into rendering internals: it reads the player
//! position, moves the player sideways, spawns and removes obstacle visuals,
//! and requests animation cues. `TrackScene` is the in-memory implementation
//! backing the terminal view, the simulator and the tests.

use crate::runner::{Obstacle, ObstacleHandle, ObstacleShape, Position};
use std::collections::BTreeMap;

/// Character animation clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationCue {
    Dance,
    Running,
    Jump,
    Death,
}

impl AnimationCue {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dance => "Dance",
            Self::Running => "Running",
            Self::Jump => "Jump",
            Self::Death => "Death",
        }
    }
}

pub trait Scene {
    /// Current player position, or `None` while the model is not loaded.
    fn player_position(&self) -> Option<Position>;

    /// Move the player sideways. Ignored while the model is not loaded.
    fn set_player_lateral(&mut self, x: f64);

    /// Put the player back at `position` (run start).
    fn reset_player(&mut self, position: Position);

    fn spawn(&mut self, obstacle: &Obstacle) -> ObstacleHandle;

    fn remove(&mut self, handle: ObstacleHandle);

    fn set_animation(&mut self, cue: AnimationCue);
}

/// Headless scene: tracks the player and which obstacle visuals exist.
#[derive(Debug, Clone)]
pub struct TrackScene {
    player: Option<Position>,
    animation: AnimationCue,
    live: BTreeMap<ObstacleHandle, ObstacleShape>,
    next_handle: u64,
    pub spawned_total: u64,
    pub removed_total: u64,
}

impl TrackScene {
    /// A scene whose player model is already loaded at `start`.
    pub fn new(start: Position) -> Self {
        Self {
            player: Some(start),
            ..Self::unloaded()
        }
    }

    /// A scene still waiting for its player model.
    pub fn unloaded() -> Self {
        Self {
            player: None,
            animation: AnimationCue::Dance,
            live: BTreeMap::new(),
            next_handle: 1,
            spawned_total: 0,
            removed_total: 0,
        }
    }

    /// Mark the player model as loaded.
    pub fn load_player(&mut self, position: Position) {
        self.player = Some(position);
    }

    pub fn animation(&self) -> AnimationCue {
        self.animation
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: ObstacleHandle) -> bool {
        self.live.contains_key(&handle)
    }
}

impl Default for TrackScene {
    fn default() -> Self {
        Self::unloaded()
    }
}

impl Scene for TrackScene {
    fn player_position(&self) -> Option<Position> {
        self.player
    }

    fn set_player_lateral(&mut self, x: f64) {
        if let Some(player) = self.player.as_mut() {
            player.x = x;
        }
    }

    fn reset_player(&mut self, position: Position) {
        if self.player.is_some() {
            self.player = Some(position);
        }
    }

    fn spawn(&mut self, obstacle: &Obstacle) -> ObstacleHandle {
        let handle = ObstacleHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle, obstacle.shape);
        self.spawned_total += 1;
        handle
    }

    fn remove(&mut self, handle: ObstacleHandle) {
        if self.live.remove(&handle).is_some() {
            self.removed_total += 1;
        }
    }

    fn set_animation(&mut self, cue: AnimationCue) {
        self.animation = cue;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_scene_has_no_player() {
        let mut scene = TrackScene::unloaded();
        assert!(scene.player_position().is_none());
        scene.set_player_lateral(3.0);
        scene.reset_player(Position::new(0.0, 0.5, 0.0));
        assert!(scene.player_position().is_none());
    }

    #[test]
    fn test_lateral_moves_only_x() {
        let mut scene = TrackScene::new(Position::new(0.0, 0.5, 0.0));
        scene.set_player_lateral(-3.0);
        assert_eq!(scene.player_position(), Some(Position::new(-3.0, 0.5, 0.0)));
    }

    #[test]
    fn test_spawn_and_remove_handles() {
        let mut scene = TrackScene::new(Position::default());
        let obstacle = Obstacle::new(1, ObstacleShape::Block, Position::default());
        let a = scene.spawn(&obstacle);
        let b = scene.spawn(&obstacle);
        assert_ne!(a, b);
        assert_eq!(scene.live_count(), 2);

        scene.remove(a);
        scene.remove(a);
        assert_eq!(scene.live_count(), 1);
        assert_eq!(scene.removed_total, 1);
        assert!(scene.is_live(b));
    }
}
