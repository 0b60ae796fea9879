//! Fixed-step scheduler for the gameplay loop.
//!
//! `game_tick()` runs one 16ms simulation step: death-cue countdown, score
//! timer, spawn timer, then obstacle movement and collision. It returns a
//! [`TickResult`] describing what happened so the presentation layer can
//! update the UI and hand finished runs to score sync without the gameplay
//! code knowing about either.

use crate::core::constants::{MAX_FRAME_DT_MS, SIMULATION_TICK_MS};
use crate::core::game_logic::{apply_event, SessionEvent};
use crate::core::game_state::{GameSession, RunSummary, SessionMode};
use crate::progression::Tier;
use crate::runner::logic::{spawn_obstacle, step_obstacles};
use crate::runner::{ObstacleFate, ObstacleShape};
use crate::scene::{AnimationCue, Scene};
use rand::Rng;
use tracing::{debug, info};

/// A single event produced by a game tick or a session transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    ModeChanged {
        from: SessionMode,
        to: SessionMode,
    },
    ScoreIncreased {
        score: u64,
    },
    /// A color tier unlocked during the run.
    TierUnlocked {
        tier: Tier,
    },
    ObstacleSpawned {
        id: u64,
        shape: ObstacleShape,
        x: f64,
    },
    /// An obstacle went behind the player untouched.
    ObstaclePassed {
        id: u64,
    },
    Collision {
        id: u64,
        distance: f64,
    },
    ExtraLifeGranted {
        score: u64,
        extra_lives_used: u32,
    },
    RunFinished(RunSummary),
}

/// Result of processing one or more ticks.
#[derive(Debug, Clone, Default)]
pub struct TickResult {
    /// Events in chronological order.
    pub events: Vec<TickEvent>,
}

impl TickResult {
    pub fn finished_run(&self) -> Option<&RunSummary> {
        self.events.iter().find_map(|e| match e {
            TickEvent::RunFinished(summary) => Some(summary),
            _ => None,
        })
    }

    pub fn collided(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TickEvent::Collision { .. }))
    }
}

/// Feed elapsed wall time into the session and step as many fixed ticks
/// as fit. `dt_ms` is clamped to 100ms so a stalled frame cannot flood the
/// track.
pub fn advance<S: Scene, R: Rng>(
    session: &mut GameSession,
    scene: &mut S,
    dt_ms: u64,
    rng: &mut R,
) -> TickResult {
    let mut result = TickResult::default();
    session.accumulated_time_ms += dt_ms.min(MAX_FRAME_DT_MS);

    while session.accumulated_time_ms >= SIMULATION_TICK_MS {
        session.accumulated_time_ms -= SIMULATION_TICK_MS;
        result.events.extend(game_tick(session, scene, rng).events);
    }

    result
}

/// Processes a single 16ms simulation step.
pub fn game_tick<S: Scene, R: Rng>(
    session: &mut GameSession,
    scene: &mut S,
    rng: &mut R,
) -> TickResult {
    let mut result = TickResult::default();

    match session.mode {
        SessionMode::Collided => {
            // ── Death cue countdown ──────────────────────────────────
            session.cue_remaining_ms = session.cue_remaining_ms.saturating_sub(SIMULATION_TICK_MS);
            if session.cue_remaining_ms == 0 {
                result
                    .events
                    .extend(apply_event(session, scene, SessionEvent::CueFinished));
            }
        }
        SessionMode::Running => running_tick(session, scene, rng, &mut result),
        _ => {}
    }

    result
}

fn running_tick<S: Scene, R: Rng>(
    session: &mut GameSession,
    scene: &mut S,
    rng: &mut R,
    result: &mut TickResult,
) {
    session.tick_count += 1;

    // ── 1. Jump cue ─────────────────────────────────────────────
    if session.jump_remaining_ms > 0 {
        session.jump_remaining_ms = session.jump_remaining_ms.saturating_sub(SIMULATION_TICK_MS);
        if session.jump_remaining_ms == 0 {
            scene.set_animation(AnimationCue::Running);
        }
    }

    // ── 2. Score timer ──────────────────────────────────────────
    session.score_timer_ms += SIMULATION_TICK_MS;
    while session.score_timer_ms >= session.config.score_interval_ms {
        session.score_timer_ms -= session.config.score_interval_ms;
        session.score += 1;
        result.events.push(TickEvent::ScoreIncreased {
            score: session.score,
        });

        if session.score > session.high_score {
            session.high_score = session.score;
            for tier in session.unlocks.absorb_high_score(session.high_score) {
                info!(tier = tier.name(), score = session.score, "character unlocked");
                session.add_message(format!("{} character unlocked!", tier.name()));
                result.events.push(TickEvent::TierUnlocked { tier });
            }
        }
    }

    // ── 3. Spawn timer ──────────────────────────────────────────
    session.spawn_timer_ms += SIMULATION_TICK_MS;
    if session.spawn_timer_ms >= session.config.spawn_interval_ms {
        session.spawn_timer_ms -= session.config.spawn_interval_ms;
        let id = session.next_id();
        let mut obstacle = spawn_obstacle(id, &session.config, rng);
        obstacle.handle = Some(scene.spawn(&obstacle));
        debug!(id, shape = obstacle.shape.name(), x = obstacle.position.x, "obstacle spawned");
        result.events.push(TickEvent::ObstacleSpawned {
            id,
            shape: obstacle.shape,
            x: obstacle.position.x,
        });
        session.obstacles.push(obstacle);
    }

    // ── 4. Move obstacles, despawn, detect collisions ───────────
    let player = scene.player_position();
    let obstacles = std::mem::take(&mut session.obstacles);
    let step = step_obstacles(obstacles, player, &session.config);
    session.obstacles = step.remaining;

    let mut collided = false;
    for (obstacle, fate) in &step.removed {
        if let Some(handle) = obstacle.handle {
            scene.remove(handle);
        }
        match fate {
            ObstacleFate::Passed => {
                result.events.push(TickEvent::ObstaclePassed { id: obstacle.id });
            }
            ObstacleFate::Collided => {
                let distance = player
                    .map(|p| p.distance_to(&obstacle.position))
                    .unwrap_or_default();
                info!(id = obstacle.id, distance, score = session.score, "collision");
                result.events.push(TickEvent::Collision {
                    id: obstacle.id,
                    distance,
                });
                collided = true;
            }
        }
    }

    // ── 5. Collision freezes the run ────────────────────────────
    if collided {
        result
            .events
            .extend(apply_event(session, scene, SessionEvent::Collision));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::runner::{Obstacle, Position};
    use crate::scene::TrackScene;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn running() -> (GameSession, TrackScene) {
        let mut session = GameSession::fresh(RunnerConfig::default());
        let mut scene = TrackScene::new(session.start_position);
        apply_event(&mut session, &mut scene, SessionEvent::Start);
        (session, scene)
    }

    fn run_ms(session: &mut GameSession, scene: &mut TrackScene, ms: u64, rng: &mut ChaCha8Rng) -> TickResult {
        let mut result = TickResult::default();
        let mut remaining = ms;
        while remaining > 0 {
            let dt = remaining.min(MAX_FRAME_DT_MS);
            result.events.extend(advance(session, scene, dt, rng).events);
            remaining -= dt;
        }
        result
    }

    #[test]
    fn test_score_one_point_per_second() {
        let (mut session, mut scene) = running();
        let mut rng = create_test_rng();
        // Keep the track clear so nothing collides
        scene.load_player(Position::new(0.0, 0.5, -1000.0));
        run_ms(&mut session, &mut scene, 3000, &mut rng);
        assert_eq!(session.score, 2); // 187 ticks * 16ms = 2992ms
        run_ms(&mut session, &mut scene, 16, &mut rng);
        assert_eq!(session.score, 3);
    }

    #[test]
    fn test_score_frozen_outside_running() {
        let mut session = GameSession::fresh(RunnerConfig::default());
        let mut scene = TrackScene::new(session.start_position);
        let mut rng = create_test_rng();
        run_ms(&mut session, &mut scene, 5000, &mut rng);
        assert_eq!(session.score, 0);
        assert!(session.obstacles.is_empty());
    }

    #[test]
    fn test_dt_clamped() {
        let (mut session, mut scene) = running();
        let mut rng = create_test_rng();
        advance(&mut session, &mut scene, 10_000, &mut rng);
        assert_eq!(session.tick_count, MAX_FRAME_DT_MS / SIMULATION_TICK_MS);
        assert_eq!(session.accumulated_time_ms, MAX_FRAME_DT_MS % SIMULATION_TICK_MS);
    }

    #[test]
    fn test_spawn_every_interval() {
        let (mut session, mut scene) = running();
        let mut rng = create_test_rng();
        scene.load_player(Position::new(0.0, 0.5, -1000.0));
        let result = run_ms(&mut session, &mut scene, 10_016, &mut rng);
        let spawned = result
            .events
            .iter()
            .filter(|e| matches!(e, TickEvent::ObstacleSpawned { .. }))
            .count();
        assert_eq!(spawned, 2);
        assert_eq!(scene.live_count(), session.obstacles.len());
    }

    #[test]
    fn test_collision_freezes_then_offers_challenge() {
        let (mut session, mut scene) = running();
        let mut rng = create_test_rng();
        let mut obstacle = Obstacle::new(99, ObstacleShape::Block, Position::new(0.0, 1.0, 1.0));
        obstacle.handle = Some(scene.spawn(&obstacle));
        session.obstacles.push(obstacle);

        let result = game_tick(&mut session, &mut scene, &mut rng);
        assert!(result.collided());
        assert_eq!(session.mode, SessionMode::Collided);
        assert_eq!(scene.live_count(), 0);

        let frozen_score = session.score;
        let cue_ms = session.config.collision_cue_ms;
        let result = run_ms(&mut session, &mut scene, cue_ms, &mut rng);
        assert_eq!(session.mode, SessionMode::MiniGameForExtraLife);
        assert_eq!(session.score, frozen_score);
        assert!(result.events.iter().any(|e| matches!(
            e,
            TickEvent::ModeChanged {
                to: SessionMode::MiniGameForExtraLife,
                ..
            }
        )));
    }

    #[test]
    fn test_no_player_no_collision() {
        let mut session = GameSession::fresh(RunnerConfig::default());
        let mut scene = TrackScene::unloaded();
        let mut rng = create_test_rng();
        apply_event(&mut session, &mut scene, SessionEvent::Start);
        let mut obstacle = Obstacle::new(1, ObstacleShape::Block, Position::new(0.0, 0.5, 0.2));
        obstacle.handle = Some(scene.spawn(&obstacle));
        session.obstacles.push(obstacle);

        let result = game_tick(&mut session, &mut scene, &mut rng);
        assert!(!result.collided());
        assert_eq!(session.mode, SessionMode::Running);
    }

    #[test]
    fn test_tier_unlocked_mid_run() {
        let (mut session, mut scene) = running();
        let mut rng = create_test_rng();
        session.score = 49;
        session.score_timer_ms = session.config.score_interval_ms - SIMULATION_TICK_MS;
        scene.load_player(Position::new(0.0, 0.5, -1000.0));

        let result = game_tick(&mut session, &mut scene, &mut rng);
        assert_eq!(session.score, 50);
        assert!(session.unlocks.green);
        assert!(result
            .events
            .contains(&TickEvent::TierUnlocked { tier: Tier::Green }));
    }

    #[test]
    fn test_jump_cue_returns_to_running() {
        let (mut session, mut scene) = running();
        let mut rng = create_test_rng();
        crate::core::game_logic::jump(&mut session, &mut scene);
        run_ms(&mut session, &mut scene, 1000, &mut rng);
        assert_eq!(scene.animation(), AnimationCue::Running);
        assert_eq!(session.jump_remaining_ms, 0);
    }
}
