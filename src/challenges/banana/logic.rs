//! Extra-life puzzle logic: answer entry and attempt accounting.

use super::types::{ChallengeResult, ExtraLifeChallenge};

/// Longest answer the input field accepts.
const MAX_ANSWER_LEN: usize = 9;

/// UI-agnostic input actions for the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeInput {
    Digit(char),
    Minus,
    Backspace,
    Submit,
    Skip,
    Other,
}

/// Process player input. Returns true if the challenge state changed.
pub fn process_input(challenge: &mut ExtraLifeChallenge, input: ChallengeInput) -> bool {
    if challenge.result.is_some() {
        return false;
    }

    match input {
        ChallengeInput::Digit(c) if c.is_ascii_digit() => {
            if challenge.answer_input.len() >= MAX_ANSWER_LEN {
                return false;
            }
            challenge.answer_input.push(c);
            true
        }
        ChallengeInput::Digit(_) => false,
        ChallengeInput::Minus => {
            if challenge.answer_input.is_empty() {
                challenge.answer_input.push('-');
                true
            } else {
                false
            }
        }
        ChallengeInput::Backspace => challenge.answer_input.pop().is_some(),
        ChallengeInput::Submit => submit_answer(challenge),
        ChallengeInput::Skip => {
            challenge.result = Some(ChallengeResult::Skipped);
            challenge.message = Some("Skipped. No extra life this time.".to_string());
            true
        }
        ChallengeInput::Other => false,
    }
}

/// Check the typed answer. Returns true if an attempt was consumed or the
/// puzzle was solved; false if there was nothing to submit.
pub fn submit_answer(challenge: &mut ExtraLifeChallenge) -> bool {
    if challenge.result.is_some() {
        return false;
    }
    let solution = match challenge.puzzle.as_ref() {
        Some(puzzle) => puzzle.solution,
        None => return false,
    };
    let answer = match challenge.answer_input.trim().parse::<i64>() {
        Ok(answer) => answer,
        Err(_) => return false,
    };

    challenge.answer_input.clear();

    if answer == solution {
        challenge.result = Some(ChallengeResult::Solved);
        challenge.message = Some("Correct! Getting extra life...".to_string());
        return true;
    }

    challenge.attempts_used += 1;
    if challenge.attempts_used >= challenge.max_attempts {
        challenge.result = Some(ChallengeResult::Failed);
        challenge.message = Some(format!("Out of attempts. The answer was {}.", solution));
    } else {
        challenge.message = Some(format!(
            "Incorrect answer! Try again. ({} left)",
            challenge.attempts_remaining()
        ));
    }
    true
}
