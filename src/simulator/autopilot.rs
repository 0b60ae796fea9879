//! A simple dodging policy for headless runs.

use crate::core::game_logic::{move_player, LateralDirection};
use crate::core::game_state::GameSession;
use crate::scene::Scene;

/// How far ahead (world units) the autopilot watches for obstacles.
const LOOKAHEAD: f64 = 12.0;

/// Step away from the nearest obstacle that would pass too close.
/// Returns true if the player moved.
pub fn autopilot_steer<S: Scene>(session: &GameSession, scene: &mut S) -> bool {
    if !session.is_running() {
        return false;
    }
    let Some(player) = scene.player_position() else {
        return false;
    };
    let config = &session.config;
    let danger = config.collision_radius + config.lateral_step * 0.5;

    let threat = session
        .obstacles
        .iter()
        .filter(|o| o.position.z > player.z - 1.0 && o.position.z - player.z < LOOKAHEAD)
        .filter(|o| (o.position.x - player.x).abs() < danger)
        .min_by(|a, b| a.position.z.total_cmp(&b.position.z));
    let Some(threat) = threat else {
        return false;
    };

    let away = if threat.position.x > player.x {
        LateralDirection::Left
    } else {
        LateralDirection::Right
    };
    if move_player(session, scene, away) {
        return true;
    }
    // Pinned against the lane edge: go around the other side
    let around = match away {
        LateralDirection::Left => LateralDirection::Right,
        LateralDirection::Right => LateralDirection::Left,
    };
    move_player(session, scene, around)
}
