//! Challenges offered between runs. Currently only the extra-life puzzle.

pub mod banana;

pub use banana::{
    default_source, generate_arithmetic_puzzle, process_input, submit_answer, ArithmeticPuzzles,
    BananaApi, BananaPuzzle, ChallengeInput, ChallengeResult, ExtraLifeChallenge, FallbackSource,
    PuzzleError, PuzzleSource,
};
