//! Pure text helpers: learner input, classification and highlighting.
//!
//! Nothing in this module performs I/O, so every function is unit-testable
//! in isolation.

pub mod classify;
pub mod highlight;
pub mod input;

pub use classify::{classify, is_single_word, InputKind};
pub use highlight::highlight;
pub use input::{Difficulty, DifficultyParseError, TargetInput};
