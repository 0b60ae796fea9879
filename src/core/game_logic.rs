//! Session state machine.
//!
//! `next_mode` is the pure transition table; `apply_event` runs it against a
//! session and performs the entry actions (resetting a run, freezing on a
//! collision, opening the extra-life puzzle, finalizing the result).

use crate::challenges::{process_input, ChallengeInput, ChallengeResult, ExtraLifeChallenge};
use crate::core::constants::JUMP_CUE_MS;
use crate::core::game_state::{GameSession, RunSummary, SessionMode};
use crate::core::tick::TickEvent;
use crate::runner::logic::clamp_lateral;
use crate::scene::{AnimationCue, Scene};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    /// Leave a running session without dying.
    Stop,
    Collision,
    /// The death cue finished playing.
    CueFinished,
    ChallengeSolved,
    /// Attempts exhausted, the puzzle was skipped, or the player left
    /// during the death cue.
    ChallengeFailed,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LateralDirection {
    Left,
    Right,
}

impl LateralDirection {
    fn sign(&self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// The transition table. `None` means the event is ignored in `mode`.
pub fn next_mode(mode: SessionMode, event: SessionEvent) -> Option<SessionMode> {
    use SessionEvent as E;
    use SessionMode as M;

    match (mode, event) {
        (_, E::Restart) => Some(M::Running),
        (M::Idle, E::Start) => Some(M::Running),
        (M::Running, E::Stop) => Some(M::Idle),
        (M::Running, E::Collision) => Some(M::Collided),
        (M::Collided, E::CueFinished) => Some(M::MiniGameForExtraLife),
        (M::Collided, E::ChallengeFailed) => Some(M::GameOver),
        (M::MiniGameForExtraLife, E::ChallengeSolved) => Some(M::Running),
        (M::MiniGameForExtraLife, E::ChallengeFailed) => Some(M::GameOver),
        _ => None,
    }
}

/// Feed an event to the session. Ignored events return no tick events.
pub fn apply_event<S: Scene>(
    session: &mut GameSession,
    scene: &mut S,
    event: SessionEvent,
) -> Vec<TickEvent> {
    let from = session.mode;
    let Some(to) = next_mode(from, event) else {
        debug!(mode = from.name(), ?event, "event ignored");
        return Vec::new();
    };

    let mut events = vec![TickEvent::ModeChanged { from, to }];
    info!(from = from.name(), to = to.name(), ?event, score = session.score, "session transition");

    match event {
        SessionEvent::Start | SessionEvent::Restart => {
            if let Some(summary) = finalize_run(session) {
                events.push(TickEvent::RunFinished(summary));
            }
            begin_run(session, scene);
        }
        SessionEvent::Stop => {
            clear_obstacles(session, scene);
            scene.set_animation(AnimationCue::Dance);
            if let Some(summary) = finalize_run(session) {
                events.push(TickEvent::RunFinished(summary));
            }
        }
        SessionEvent::Collision => {
            session.cue_remaining_ms = session.config.collision_cue_ms;
            session.jump_remaining_ms = 0;
            scene.set_animation(AnimationCue::Death);
            session.add_message(format!("Crashed at score {}!", session.score));
        }
        SessionEvent::CueFinished => {
            session.cue_remaining_ms = 0;
            session.active_challenge =
                Some(ExtraLifeChallenge::new(session.config.max_puzzle_attempts));
            session.add_message("Solve the banana puzzle for an extra life.");
        }
        SessionEvent::ChallengeSolved => {
            session.active_challenge = None;
            session.extra_lives_used += 1;
            clear_obstacles(session, scene);
            session.spawn_timer_ms = 0;
            scene.set_animation(AnimationCue::Running);
            session.add_message("Extra life! Keep running.");
            events.push(TickEvent::ExtraLifeGranted {
                score: session.score,
                extra_lives_used: session.extra_lives_used,
            });
        }
        SessionEvent::ChallengeFailed => {
            session.active_challenge = None;
            session.cue_remaining_ms = 0;
            session.add_message(format!("Game over. Final score: {}", session.score));
            if let Some(summary) = finalize_run(session) {
                events.push(TickEvent::RunFinished(summary));
            }
        }
    }

    session.mode = to;
    events
}

/// Reset everything that belongs to a single run and start running.
fn begin_run<S: Scene>(session: &mut GameSession, scene: &mut S) {
    clear_obstacles(session, scene);
    session.score = 0;
    session.score_timer_ms = 0;
    session.spawn_timer_ms = 0;
    session.accumulated_time_ms = 0;
    session.tick_count = 0;
    session.cue_remaining_ms = 0;
    session.jump_remaining_ms = 0;
    session.extra_lives_used = 0;
    session.active_challenge = None;
    session.starting_high_score = session.high_score;
    session.run_finalized = false;
    scene.reset_player(session.start_position);
    scene.set_animation(AnimationCue::Running);
}

fn clear_obstacles<S: Scene>(session: &mut GameSession, scene: &mut S) {
    for obstacle in session.obstacles.drain(..) {
        if let Some(handle) = obstacle.handle {
            scene.remove(handle);
        }
    }
}

/// Close out the current run once. Later calls return `None`.
pub fn finalize_run(session: &mut GameSession) -> Option<RunSummary> {
    if session.run_finalized {
        return None;
    }
    session.run_finalized = true;

    let summary = RunSummary {
        score: session.score,
        character: session.character,
        high_score: session.high_score,
        new_high_score: session.score > session.starting_high_score,
        extra_lives_used: session.extra_lives_used,
        ticks: session.tick_count,
    };
    info!(
        score = summary.score,
        high_score = summary.high_score,
        new_high_score = summary.new_high_score,
        character = summary.character.name(),
        "run finished"
    );
    Some(summary)
}

/// Shift the runner one step sideways. Only while running.
pub fn move_player<S: Scene>(
    session: &GameSession,
    scene: &mut S,
    direction: LateralDirection,
) -> bool {
    if !session.is_running() {
        return false;
    }
    let Some(position) = scene.player_position() else {
        return false;
    };
    let x = clamp_lateral(
        position.x + direction.sign() * session.config.lateral_step,
        &session.config,
    );
    if (x - position.x).abs() < f64::EPSILON {
        return false;
    }
    scene.set_player_lateral(x);
    true
}

/// Play the jump cue. Purely visual; collision geometry is unchanged.
pub fn jump<S: Scene>(session: &mut GameSession, scene: &mut S) -> bool {
    if !session.is_running() || session.jump_remaining_ms > 0 {
        return false;
    }
    session.jump_remaining_ms = JUMP_CUE_MS;
    scene.set_animation(AnimationCue::Jump);
    true
}

/// Forward puzzle input and resolve the challenge once it finishes.
pub fn challenge_input<S: Scene>(
    session: &mut GameSession,
    scene: &mut S,
    input: ChallengeInput,
) -> Vec<TickEvent> {
    let Some(challenge) = session.active_challenge.as_mut() else {
        return Vec::new();
    };
    if process_input(challenge, input) {
        if let Some(message) = challenge.message.clone() {
            session.add_message(message);
        }
    }
    resolve_challenge(session, scene)
}

/// Turn a finished challenge into the matching session event.
pub fn resolve_challenge<S: Scene>(session: &mut GameSession, scene: &mut S) -> Vec<TickEvent> {
    if session.mode != SessionMode::MiniGameForExtraLife {
        return Vec::new();
    }
    let result = session.active_challenge.as_ref().and_then(|c| c.result);
    match result {
        Some(ChallengeResult::Solved) => apply_event(session, scene, SessionEvent::ChallengeSolved),
        Some(ChallengeResult::Failed) | Some(ChallengeResult::Skipped) => {
            apply_event(session, scene, SessionEvent::ChallengeFailed)
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::BananaPuzzle;
    use crate::config::RunnerConfig;
    use crate::runner::{Obstacle, ObstacleShape, Position};
    use crate::scene::TrackScene;

    const ALL_MODES: [SessionMode; 5] = [
        SessionMode::Idle,
        SessionMode::Running,
        SessionMode::Collided,
        SessionMode::MiniGameForExtraLife,
        SessionMode::GameOver,
    ];

    const ALL_EVENTS: [SessionEvent; 7] = [
        SessionEvent::Start,
        SessionEvent::Stop,
        SessionEvent::Collision,
        SessionEvent::CueFinished,
        SessionEvent::ChallengeSolved,
        SessionEvent::ChallengeFailed,
        SessionEvent::Restart,
    ];

    fn setup() -> (GameSession, TrackScene) {
        let session = GameSession::fresh(RunnerConfig::default());
        let scene = TrackScene::new(session.start_position);
        (session, scene)
    }

    fn with_obstacle(session: &mut GameSession, scene: &mut TrackScene) {
        let mut obstacle = Obstacle::new(
            session.next_id(),
            ObstacleShape::Block,
            Position::new(4.0, 1.0, 30.0),
        );
        obstacle.handle = Some(scene.spawn(&obstacle));
        session.obstacles.push(obstacle);
    }

    fn enter_minigame(session: &mut GameSession, scene: &mut TrackScene) {
        apply_event(session, scene, SessionEvent::Start);
        apply_event(session, scene, SessionEvent::Collision);
        apply_event(session, scene, SessionEvent::CueFinished);
    }

    #[test]
    fn test_transition_table_is_deterministic() {
        for mode in ALL_MODES {
            for event in ALL_EVENTS {
                assert_eq!(next_mode(mode, event), next_mode(mode, event));
            }
        }
        assert_eq!(
            next_mode(SessionMode::Idle, SessionEvent::Start),
            Some(SessionMode::Running)
        );
        assert_eq!(
            next_mode(SessionMode::Running, SessionEvent::Collision),
            Some(SessionMode::Collided)
        );
        assert_eq!(
            next_mode(SessionMode::MiniGameForExtraLife, SessionEvent::ChallengeFailed),
            Some(SessionMode::GameOver)
        );
    }

    #[test]
    fn test_restart_valid_everywhere() {
        for mode in ALL_MODES {
            assert_eq!(next_mode(mode, SessionEvent::Restart), Some(SessionMode::Running));
        }
    }

    #[test]
    fn test_invalid_events_ignored() {
        let (mut session, mut scene) = setup();
        for event in [
            SessionEvent::Stop,
            SessionEvent::Collision,
            SessionEvent::CueFinished,
            SessionEvent::ChallengeSolved,
            SessionEvent::ChallengeFailed,
        ] {
            assert!(apply_event(&mut session, &mut scene, event).is_empty());
            assert_eq!(session.mode, SessionMode::Idle);
        }
    }

    #[test]
    fn test_start_plays_running_cue() {
        let (mut session, mut scene) = setup();
        let events = apply_event(&mut session, &mut scene, SessionEvent::Start);
        assert_eq!(session.mode, SessionMode::Running);
        assert_eq!(scene.animation(), AnimationCue::Running);
        assert!(!session.run_finalized);
        // Nothing to finalize before the first run
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_collision_plays_death_cue() {
        let (mut session, mut scene) = setup();
        apply_event(&mut session, &mut scene, SessionEvent::Start);
        apply_event(&mut session, &mut scene, SessionEvent::Collision);
        assert_eq!(session.mode, SessionMode::Collided);
        assert_eq!(scene.animation(), AnimationCue::Death);
        assert_eq!(session.cue_remaining_ms, session.config.collision_cue_ms);
    }

    #[test]
    fn test_cue_finished_opens_challenge() {
        let (mut session, mut scene) = setup();
        enter_minigame(&mut session, &mut scene);
        assert_eq!(session.mode, SessionMode::MiniGameForExtraLife);
        let challenge = session.active_challenge.as_ref().unwrap();
        assert_eq!(challenge.max_attempts, 3);
    }

    #[test]
    fn test_solved_resumes_with_score_and_clears_obstacles() {
        let (mut session, mut scene) = setup();
        enter_minigame(&mut session, &mut scene);
        session.score = 17;
        with_obstacle(&mut session, &mut scene);

        let events = apply_event(&mut session, &mut scene, SessionEvent::ChallengeSolved);
        assert_eq!(session.mode, SessionMode::Running);
        assert_eq!(session.score, 17);
        assert!(session.obstacles.is_empty());
        assert_eq!(scene.live_count(), 0);
        assert_eq!(session.extra_lives_used, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, TickEvent::ExtraLifeGranted { score: 17, .. })));
    }

    #[test]
    fn test_failed_finalizes_once() {
        let (mut session, mut scene) = setup();
        enter_minigame(&mut session, &mut scene);
        session.score = 9;
        let events = apply_event(&mut session, &mut scene, SessionEvent::ChallengeFailed);
        assert_eq!(session.mode, SessionMode::GameOver);
        let finished: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                TickEvent::RunFinished(summary) => Some(summary.score),
                _ => None,
            })
            .collect();
        assert_eq!(finished, vec![9]);

        // Restart after game over does not report the run again
        let events = apply_event(&mut session, &mut scene, SessionEvent::Restart);
        assert!(!events.iter().any(|e| matches!(e, TickEvent::RunFinished(_))));
    }

    #[test]
    fn test_giving_up_during_death_cue_finalizes() {
        let (mut session, mut scene) = setup();
        apply_event(&mut session, &mut scene, SessionEvent::Start);
        session.score = 42;
        apply_event(&mut session, &mut scene, SessionEvent::Collision);

        let events = apply_event(&mut session, &mut scene, SessionEvent::ChallengeFailed);
        assert_eq!(session.mode, SessionMode::GameOver);
        assert_eq!(session.cue_remaining_ms, 0);
        assert!(session.run_finalized);
        assert!(events
            .iter()
            .any(|e| matches!(e, TickEvent::RunFinished(s) if s.score == 42)));
    }

    #[test]
    fn test_restart_mid_run_finalizes_and_resets() {
        let (mut session, mut scene) = setup();
        apply_event(&mut session, &mut scene, SessionEvent::Start);
        session.score = 33;
        scene.set_player_lateral(6.0);
        with_obstacle(&mut session, &mut scene);

        let events = apply_event(&mut session, &mut scene, SessionEvent::Restart);
        assert!(events
            .iter()
            .any(|e| matches!(e, TickEvent::RunFinished(s) if s.score == 33)));
        assert_eq!(session.score, 0);
        assert!(session.obstacles.is_empty());
        assert_eq!(scene.player_position(), Some(session.start_position));
    }

    #[test]
    fn test_stop_returns_to_idle_and_finalizes() {
        let (mut session, mut scene) = setup();
        apply_event(&mut session, &mut scene, SessionEvent::Start);
        session.score = 4;
        let events = apply_event(&mut session, &mut scene, SessionEvent::Stop);
        assert_eq!(session.mode, SessionMode::Idle);
        assert_eq!(scene.animation(), AnimationCue::Dance);
        assert!(events.iter().any(|e| matches!(e, TickEvent::RunFinished(_))));
    }

    #[test]
    fn test_move_player_clamped_to_lane() {
        let (mut session, mut scene) = setup();
        apply_event(&mut session, &mut scene, SessionEvent::Start);
        for _ in 0..5 {
            move_player(&session, &mut scene, LateralDirection::Right);
        }
        assert_eq!(scene.player_position().unwrap().x, session.config.lane_half_width);
        assert!(!move_player(&session, &mut scene, LateralDirection::Right));
        assert!(move_player(&session, &mut scene, LateralDirection::Left));
        assert!((scene.player_position().unwrap().x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_controls_ignored_when_not_running() {
        let (mut session, mut scene) = setup();
        assert!(!move_player(&session, &mut scene, LateralDirection::Left));
        assert!(!jump(&mut session, &mut scene));
        assert_eq!(scene.player_position(), Some(session.start_position));
    }

    #[test]
    fn test_jump_is_visual_only() {
        let (mut session, mut scene) = setup();
        apply_event(&mut session, &mut scene, SessionEvent::Start);
        let before = scene.player_position();
        assert!(jump(&mut session, &mut scene));
        assert_eq!(scene.animation(), AnimationCue::Jump);
        assert_eq!(scene.player_position(), before);
        // No double jump while the cue plays
        assert!(!jump(&mut session, &mut scene));
    }

    #[test]
    fn test_challenge_input_resolves_solved() {
        let (mut session, mut scene) = setup();
        enter_minigame(&mut session, &mut scene);
        if let Some(challenge) = session.active_challenge.as_mut() {
            challenge.set_puzzle(BananaPuzzle {
                question: "1 + ? = 3".to_string(),
                solution: 2,
            });
        }
        challenge_input(&mut session, &mut scene, ChallengeInput::Digit('2'));
        let events = challenge_input(&mut session, &mut scene, ChallengeInput::Submit);
        assert_eq!(session.mode, SessionMode::Running);
        assert!(!events.is_empty());
        assert!(session
            .messages
            .iter()
            .any(|m| m == "Correct! Getting extra life..."));
    }

    #[test]
    fn test_challenge_skip_ends_game() {
        let (mut session, mut scene) = setup();
        enter_minigame(&mut session, &mut scene);
        challenge_input(&mut session, &mut scene, ChallengeInput::Skip);
        assert_eq!(session.mode, SessionMode::GameOver);
        assert!(session.active_challenge.is_none());
    }
}
