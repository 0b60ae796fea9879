//! Banana puzzle: answer a question-mark puzzle to earn an extra life.

pub mod logic;
pub mod source;
pub mod types;

pub use logic::*;
pub use source::*;
pub use types::*;
