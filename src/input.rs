//! Input handling for the Game screen.
//!
//! Maps key presses to session events and challenge input, in priority
//! order: the extra-life puzzle first, then mode-specific controls.

use crate::challenges::ChallengeInput;
use crate::core::game_logic::{
    apply_event, challenge_input, jump, move_player, LateralDirection, SessionEvent,
};
use crate::core::game_state::{GameSession, SessionMode};
use crate::core::tick::TickEvent;
use crate::scene::Scene;
use crossterm::event::{KeyCode, KeyEvent};

/// Result of handling a game input event.
#[derive(Debug, Default)]
pub struct InputResult {
    /// Events produced by the key (mode changes, finished runs).
    pub events: Vec<TickEvent>,
    /// Player left the game screen.
    pub quit_to_home: bool,
}

impl InputResult {
    fn events(events: Vec<TickEvent>) -> Self {
        Self {
            events,
            quit_to_home: false,
        }
    }
}

/// Key → puzzle input. Letters and other keys are ignored.
pub fn map_challenge_key(code: KeyCode) -> ChallengeInput {
    match code {
        KeyCode::Char(c) if c.is_ascii_digit() => ChallengeInput::Digit(c),
        KeyCode::Char('-') => ChallengeInput::Minus,
        KeyCode::Backspace => ChallengeInput::Backspace,
        KeyCode::Enter => ChallengeInput::Submit,
        KeyCode::Esc => ChallengeInput::Skip,
        _ => ChallengeInput::Other,
    }
}

/// Main dispatcher for Game screen input.
pub fn handle_game_input<S: Scene>(
    key: KeyEvent,
    session: &mut GameSession,
    scene: &mut S,
) -> InputResult {
    match session.mode {
        SessionMode::MiniGameForExtraLife => {
            InputResult::events(challenge_input(session, scene, map_challenge_key(key.code)))
        }
        SessionMode::Idle => match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                InputResult::events(apply_event(session, scene, SessionEvent::Start))
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => quit(session, scene),
            _ => InputResult::default(),
        },
        SessionMode::Running => handle_running(key, session, scene),
        SessionMode::Collided => match key.code {
            KeyCode::Esc => quit(session, scene),
            _ => InputResult::default(),
        },
        SessionMode::GameOver => match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter | KeyCode::Char(' ') => {
                InputResult::events(apply_event(session, scene, SessionEvent::Restart))
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => quit(session, scene),
            _ => InputResult::default(),
        },
    }
}

fn handle_running<S: Scene>(
    key: KeyEvent,
    session: &mut GameSession,
    scene: &mut S,
) -> InputResult {
    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
            move_player(session, scene, LateralDirection::Left);
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            move_player(session, scene, LateralDirection::Right);
        }
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char(' ') => {
            jump(session, scene);
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            return InputResult::events(apply_event(session, scene, SessionEvent::Stop));
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            return InputResult::events(apply_event(session, scene, SessionEvent::Restart));
        }
        KeyCode::Esc => return quit(session, scene),
        _ => {}
    }
    InputResult::default()
}

/// Leave the game screen. An unfinished run is ended first so its score
/// is finalized: a running one stops, a crashed one is game over.
fn quit<S: Scene>(session: &mut GameSession, scene: &mut S) -> InputResult {
    let events = match session.mode {
        SessionMode::Running => apply_event(session, scene, SessionEvent::Stop),
        SessionMode::Collided | SessionMode::MiniGameForExtraLife => {
            apply_event(session, scene, SessionEvent::ChallengeFailed)
        }
        SessionMode::Idle | SessionMode::GameOver => Vec::new(),
    };
    InputResult {
        events,
        quit_to_home: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::BananaPuzzle;
    use crate::config::RunnerConfig;
    use crate::scene::TrackScene;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (GameSession, TrackScene) {
        let session = GameSession::fresh(RunnerConfig::default());
        let scene = TrackScene::new(session.start_position);
        (session, scene)
    }

    #[test]
    fn test_space_starts_from_idle() {
        let (mut session, mut scene) = setup();
        let result = handle_game_input(key(KeyCode::Char(' ')), &mut session, &mut scene);
        assert_eq!(session.mode, SessionMode::Running);
        assert!(!result.quit_to_home);
        assert!(matches!(
            result.events[0],
            TickEvent::ModeChanged {
                from: SessionMode::Idle,
                to: SessionMode::Running
            }
        ));
    }

    #[test]
    fn test_arrows_move_only_while_running() {
        let (mut session, mut scene) = setup();
        handle_game_input(key(KeyCode::Left), &mut session, &mut scene);
        assert_eq!(scene.player_position().unwrap().x, 0.0);

        handle_game_input(key(KeyCode::Enter), &mut session, &mut scene);
        handle_game_input(key(KeyCode::Left), &mut session, &mut scene);
        assert_eq!(scene.player_position().unwrap().x, -3.0);
        handle_game_input(key(KeyCode::Char('d')), &mut session, &mut scene);
        handle_game_input(key(KeyCode::Char('d')), &mut session, &mut scene);
        assert_eq!(scene.player_position().unwrap().x, 3.0);
    }

    #[test]
    fn test_stop_finishes_run() {
        let (mut session, mut scene) = setup();
        handle_game_input(key(KeyCode::Char(' ')), &mut session, &mut scene);
        session.score = 12;
        let result = handle_game_input(key(KeyCode::Char('s')), &mut session, &mut scene);
        assert_eq!(session.mode, SessionMode::Idle);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::RunFinished(summary) if summary.score == 12)));
    }

    #[test]
    fn test_esc_while_running_stops_and_quits() {
        let (mut session, mut scene) = setup();
        handle_game_input(key(KeyCode::Char(' ')), &mut session, &mut scene);
        let result = handle_game_input(key(KeyCode::Esc), &mut session, &mut scene);
        assert!(result.quit_to_home);
        assert_eq!(session.mode, SessionMode::Idle);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::RunFinished(_))));
    }

    #[test]
    fn test_esc_during_death_cue_reports_run() {
        let (mut session, mut scene) = setup();
        handle_game_input(key(KeyCode::Char(' ')), &mut session, &mut scene);
        session.score = 42;
        apply_event(&mut session, &mut scene, SessionEvent::Collision);
        assert_eq!(session.mode, SessionMode::Collided);

        let result = handle_game_input(key(KeyCode::Esc), &mut session, &mut scene);
        assert!(result.quit_to_home);
        assert_eq!(session.mode, SessionMode::GameOver);
        assert!(session.run_finalized);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::RunFinished(summary) if summary.score == 42)));
    }

    #[test]
    fn test_esc_from_game_over_reports_nothing_new() {
        let (mut session, mut scene) = setup();
        handle_game_input(key(KeyCode::Char(' ')), &mut session, &mut scene);
        apply_event(&mut session, &mut scene, SessionEvent::Collision);
        handle_game_input(key(KeyCode::Esc), &mut session, &mut scene);

        let result = handle_game_input(key(KeyCode::Esc), &mut session, &mut scene);
        assert!(result.quit_to_home);
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_puzzle_keys_feed_challenge() {
        let (mut session, mut scene) = setup();
        handle_game_input(key(KeyCode::Char(' ')), &mut session, &mut scene);
        apply_event(&mut session, &mut scene, SessionEvent::Collision);
        apply_event(&mut session, &mut scene, SessionEvent::CueFinished);
        if let Some(challenge) = session.active_challenge.as_mut() {
            challenge.set_puzzle(BananaPuzzle {
                question: "4 + ? = 11".to_string(),
                solution: 7,
            });
        }

        handle_game_input(key(KeyCode::Char('a')), &mut session, &mut scene);
        handle_game_input(key(KeyCode::Char('7')), &mut session, &mut scene);
        assert_eq!(session.active_challenge.as_ref().unwrap().answer_input, "7");

        let result = handle_game_input(key(KeyCode::Enter), &mut session, &mut scene);
        assert_eq!(session.mode, SessionMode::Running);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::ExtraLifeGranted { .. })));
    }

    #[test]
    fn test_challenge_key_mapping() {
        assert_eq!(map_challenge_key(KeyCode::Char('5')), ChallengeInput::Digit('5'));
        assert_eq!(map_challenge_key(KeyCode::Char('-')), ChallengeInput::Minus);
        assert_eq!(map_challenge_key(KeyCode::Esc), ChallengeInput::Skip);
        assert_eq!(map_challenge_key(KeyCode::Char('x')), ChallengeInput::Other);
    }
}
