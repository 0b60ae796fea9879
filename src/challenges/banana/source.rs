//! Where extra-life puzzles come from.
//!
//! The remote banana API returns `{"question": <image url>, "solution": n}`.
//! When it is unreachable a locally generated arithmetic puzzle takes its
//! place so a collision never strands the player on a loading screen.

use super::types::BananaPuzzle;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("puzzle request failed: {0}")]
    Request(String),
    #[error("puzzle response was not understood: {0}")]
    Decode(#[from] std::io::Error),
}

pub trait PuzzleSource: Send + Sync {
    fn fetch(&self) -> Result<BananaPuzzle, PuzzleError>;
}

/// HTTP client for the banana puzzle API.
pub struct BananaApi {
    url: String,
    agent: ureq::Agent,
}

impl BananaApi {
    pub fn new(url: &str, timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .build();
        Self {
            url: url.to_string(),
            agent,
        }
    }
}

impl PuzzleSource for BananaApi {
    fn fetch(&self) -> Result<BananaPuzzle, PuzzleError> {
        let puzzle: BananaPuzzle = self
            .agent
            .get(&self.url)
            .query("out", "json")
            .set("User-Agent", "banana-runner")
            .call()
            .map_err(|e| PuzzleError::Request(e.to_string()))?
            .into_json()?;
        Ok(puzzle)
    }
}

/// Build a "what replaces the question mark" arithmetic puzzle.
pub fn generate_arithmetic_puzzle<R: Rng>(rng: &mut R) -> BananaPuzzle {
    let a: i64 = rng.gen_range(2..=12);
    let b: i64 = rng.gen_range(2..=12);
    match rng.gen_range(0..3) {
        0 => BananaPuzzle {
            question: format!("{} + ? = {}", a, a + b),
            solution: b,
        },
        1 => BananaPuzzle {
            question: format!("? - {} = {}", b, a),
            solution: a + b,
        },
        _ => BananaPuzzle {
            question: format!("{} x ? = {}", a, a * b),
            solution: b,
        },
    }
}

/// Offline puzzle source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArithmeticPuzzles;

impl PuzzleSource for ArithmeticPuzzles {
    fn fetch(&self) -> Result<BananaPuzzle, PuzzleError> {
        Ok(generate_arithmetic_puzzle(&mut rand::thread_rng()))
    }
}

/// Try `primary`; on any error log it and use `fallback`.
pub struct FallbackSource<P, F> {
    pub primary: P,
    pub fallback: F,
}

impl<P: PuzzleSource, F: PuzzleSource> PuzzleSource for FallbackSource<P, F> {
    fn fetch(&self) -> Result<BananaPuzzle, PuzzleError> {
        match self.primary.fetch() {
            Ok(puzzle) => Ok(puzzle),
            Err(e) => {
                tracing::warn!(error = %e, "puzzle source failed, using fallback");
                self.fallback.fetch()
            }
        }
    }
}

/// The source the game uses for a given configuration.
pub fn default_source(puzzle_url: &str, offline: bool, timeout_secs: u64) -> Box<dyn PuzzleSource> {
    if offline {
        Box::new(ArithmeticPuzzles)
    } else {
        Box::new(FallbackSource {
            primary: BananaApi::new(puzzle_url, timeout_secs),
            fallback: ArithmeticPuzzles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Broken;

    impl PuzzleSource for Broken {
        fn fetch(&self) -> Result<BananaPuzzle, PuzzleError> {
            Err(PuzzleError::Request("connection refused".to_string()))
        }
    }

    fn evaluate(question: &str, answer: i64) -> bool {
        let filled = question.replace('?', &answer.to_string());
        let (lhs, rhs) = filled.split_once(" = ").unwrap();
        let rhs: i64 = rhs.parse().unwrap();
        let parts: Vec<&str> = lhs.split(' ').collect();
        let x: i64 = parts[0].parse().unwrap();
        let y: i64 = parts[2].parse().unwrap();
        let value = match parts[1] {
            "+" => x + y,
            "-" => x - y,
            "x" => x * y,
            op => panic!("unexpected operator {}", op),
        };
        value == rhs
    }

    #[test]
    fn test_generated_puzzles_are_consistent() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let puzzle = generate_arithmetic_puzzle(&mut rng);
            assert!(!puzzle.is_image());
            assert!(
                evaluate(&puzzle.question, puzzle.solution),
                "bad puzzle {:?}",
                puzzle
            );
        }
    }

    #[test]
    fn test_fallback_used_on_failure() {
        let source = FallbackSource {
            primary: Broken,
            fallback: ArithmeticPuzzles,
        };
        assert!(source.fetch().is_ok());
    }

    #[test]
    fn test_offline_source_never_fails() {
        let source = default_source("http://unused.test", true, 1);
        for _ in 0..10 {
            assert!(source.fetch().is_ok());
        }
    }
}
