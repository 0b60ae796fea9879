//! Obstacle spawning, movement and collision detection.
//!
//! These are pure functions over the obstacle list; the tick scheduler in
//! `core::tick` decides when to call them and forwards the results to the
//! scene.

use super::types::{Obstacle, ObstacleFate, ObstacleShape, Position};
use crate::config::RunnerConfig;
use rand::Rng;

/// Create one obstacle at the spawn line with a random shape and lane offset.
pub fn spawn_obstacle<R: Rng>(id: u64, config: &RunnerConfig, rng: &mut R) -> Obstacle {
    let shape = if rng.gen::<bool>() {
        ObstacleShape::Cylinder
    } else {
        ObstacleShape::Block
    };
    let half = config.lane_half_width;
    let x = if half > 0.0 {
        rng.gen_range(-half..=half)
    } else {
        0.0
    };
    Obstacle::new(
        id,
        shape,
        Position::new(x, config.obstacle_height, config.spawn_distance),
    )
}

/// True if the obstacle is strictly inside the collision radius.
pub fn is_colliding(player: &Position, obstacle: &Obstacle, radius: f64) -> bool {
    player.distance_squared(&obstacle.position) < radius * radius
}

/// Outcome of one movement + collision pass.
#[derive(Debug, Default)]
pub struct ObstacleStep {
    /// Obstacles still alive, in their original order.
    pub remaining: Vec<Obstacle>,
    /// Obstacles that left the live set this tick, with the reason.
    pub removed: Vec<(Obstacle, ObstacleFate)>,
}

impl ObstacleStep {
    pub fn collided(&self) -> impl Iterator<Item = &Obstacle> {
        self.removed
            .iter()
            .filter(|(_, fate)| *fate == ObstacleFate::Collided)
            .map(|(o, _)| o)
    }

    pub fn passed(&self) -> impl Iterator<Item = &Obstacle> {
        self.removed
            .iter()
            .filter(|(_, fate)| *fate == ObstacleFate::Passed)
            .map(|(o, _)| o)
    }

    pub fn had_collision(&self) -> bool {
        self.collided().next().is_some()
    }
}

/// Advance every obstacle toward the player and sort out the ones that
/// leave the live set.
///
/// Each obstacle is moved, then checked against the despawn line, then
/// against the player. A pass-through is final: the obstacle is gone before
/// any collision check could see it. With no player position the collision
/// check is skipped entirely.
pub fn step_obstacles(
    obstacles: Vec<Obstacle>,
    player: Option<Position>,
    config: &RunnerConfig,
) -> ObstacleStep {
    let mut step = ObstacleStep {
        remaining: Vec::with_capacity(obstacles.len()),
        removed: Vec::new(),
    };

    for mut obstacle in obstacles {
        obstacle.position.z -= config.obstacle_speed;

        if obstacle.position.z < config.despawn_distance {
            step.removed.push((obstacle, ObstacleFate::Passed));
            continue;
        }

        if let Some(player) = player {
            if is_colliding(&player, &obstacle, config.collision_radius) {
                step.removed.push((obstacle, ObstacleFate::Collided));
                continue;
            }
        }

        step.remaining.push(obstacle);
    }

    step
}

/// Clamp a lateral coordinate to the lane.
pub fn clamp_lateral(x: f64, config: &RunnerConfig) -> f64 {
    x.clamp(-config.lane_half_width, config.lane_half_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn player_at(x: f64) -> Position {
        Position::new(x, 0.5, 0.0)
    }

    #[test]
    fn test_spawn_within_lane_and_at_spawn_line() {
        let config = RunnerConfig::default();
        let mut rng = create_test_rng();
        for id in 0..500 {
            let obstacle = spawn_obstacle(id, &config, &mut rng);
            assert_eq!(obstacle.id, id);
            assert!(obstacle.position.x.abs() <= config.lane_half_width);
            assert!((obstacle.position.z - config.spawn_distance).abs() < f64::EPSILON);
            assert!((obstacle.position.y - config.obstacle_height).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_spawn_uses_both_shapes() {
        let config = RunnerConfig::default();
        let mut rng = create_test_rng();
        let shapes: Vec<ObstacleShape> = (0..100)
            .map(|id| spawn_obstacle(id, &config, &mut rng).shape)
            .collect();
        assert!(shapes.contains(&ObstacleShape::Cylinder));
        assert!(shapes.contains(&ObstacleShape::Block));
    }

    #[test]
    fn test_is_colliding_strict_radius() {
        let obstacle = Obstacle::new(1, ObstacleShape::Block, Position::new(2.0, 0.5, 0.0));
        assert!(!is_colliding(&player_at(0.0), &obstacle, 2.0));
        assert!(is_colliding(&player_at(0.1), &obstacle, 2.0));
    }

    #[test]
    fn test_step_moves_toward_player() {
        let config = RunnerConfig::default();
        let obstacles = vec![Obstacle::new(1, ObstacleShape::Block, Position::new(0.0, 1.0, 50.0))];
        let step = step_obstacles(obstacles, Some(player_at(0.0)), &config);
        assert_eq!(step.remaining.len(), 1);
        assert!((step.remaining[0].position.z - (50.0 - config.obstacle_speed)).abs() < 1e-9);
        assert!(step.removed.is_empty());
    }

    #[test]
    fn test_step_removes_passed_obstacles() {
        let config = RunnerConfig::default();
        let z = config.despawn_distance + config.obstacle_speed / 2.0;
        let obstacles = vec![Obstacle::new(1, ObstacleShape::Cylinder, Position::new(8.0, 1.0, z))];
        let step = step_obstacles(obstacles, Some(player_at(-8.0)), &config);
        assert!(step.remaining.is_empty());
        assert_eq!(step.passed().count(), 1);
        assert!(!step.had_collision());
    }

    #[test]
    fn test_step_detects_collision_and_removes() {
        let config = RunnerConfig::default();
        let obstacles = vec![
            Obstacle::new(1, ObstacleShape::Block, Position::new(0.0, 1.0, 0.5)),
            Obstacle::new(2, ObstacleShape::Block, Position::new(6.0, 1.0, 0.5)),
        ];
        let step = step_obstacles(obstacles, Some(player_at(0.0)), &config);
        let hit: Vec<u64> = step.collided().map(|o| o.id).collect();
        assert_eq!(hit, vec![1]);
        assert_eq!(step.remaining.len(), 1);
        assert_eq!(step.remaining[0].id, 2);
    }

    #[test]
    fn test_step_every_obstacle_in_radius_fires() {
        let config = RunnerConfig::default();
        let obstacles = vec![
            Obstacle::new(1, ObstacleShape::Block, Position::new(0.5, 1.0, 0.3)),
            Obstacle::new(2, ObstacleShape::Block, Position::new(-0.5, 1.0, 0.3)),
        ];
        let step = step_obstacles(obstacles, Some(player_at(0.0)), &config);
        assert_eq!(step.collided().count(), 2);
        assert!(step.remaining.is_empty());
    }

    #[test]
    fn test_step_without_player_skips_collision() {
        let config = RunnerConfig::default();
        let obstacles = vec![Obstacle::new(1, ObstacleShape::Block, Position::new(0.0, 0.5, 0.3))];
        let step = step_obstacles(obstacles, None, &config);
        assert_eq!(step.remaining.len(), 1);
        assert!(step.removed.is_empty());
    }

    #[test]
    fn test_step_preserves_order() {
        let config = RunnerConfig::default();
        let obstacles: Vec<Obstacle> = (0..5)
            .map(|i| Obstacle::new(i, ObstacleShape::Block, Position::new(8.0, 1.0, 10.0 * i as f64)))
            .collect();
        let step = step_obstacles(obstacles, Some(player_at(-8.0)), &config);
        let ids: Vec<u64> = step.remaining.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_clamp_lateral() {
        let config = RunnerConfig::default();
        assert!((clamp_lateral(11.0, &config) - 8.0).abs() < f64::EPSILON);
        assert!((clamp_lateral(-9.0, &config) + 8.0).abs() < f64::EPSILON);
        assert!((clamp_lateral(3.0, &config) - 3.0).abs() < f64::EPSILON);
    }
}
