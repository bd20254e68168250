//! WonderBot Quiz
//!
//! Builds a quiz from a finished explanation with one model call, falling
//! back to a fixed three-question quiz when the model is unavailable or its
//! reply is unusable, and scores submitted attempts.

pub mod generate;
pub mod scoring;

pub use generate::{fallback_quiz, generate_quiz, MINUTES_PER_QUESTION};
pub use scoring::{feedback, is_correct, score_attempt, ScoreReport};
