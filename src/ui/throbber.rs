//! Spinner and waiting text for background requests.

use std::time::{SystemTime, UNIX_EPOCH};

/// Braille spinner characters for animated loading indicators.
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Shown while the puzzle request is outstanding.
const WAITING_MESSAGES: [&str; 6] = [
    "Peeling a fresh puzzle...",
    "Counting bananas...",
    "Asking the monkeys...",
    "Shaking the banana tree...",
    "Sorting the bunch...",
    "Hold on to your peel...",
];

fn current_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Returns the current spinner character based on system time.
/// The spinner cycles every 100ms, completing a full rotation every second.
pub fn spinner_char() -> char {
    let millis = current_millis();
    SPINNER[((millis / 100) % 10) as usize]
}

/// Returns a waiting message based on a seed value.
/// The message stays stable for the same seed.
pub fn waiting_message(seed: u64) -> &'static str {
    WAITING_MESSAGES[(seed.wrapping_mul(7) as usize) % WAITING_MESSAGES.len()]
}
