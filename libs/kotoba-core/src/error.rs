//! Error types for kotoba-core.

use thiserror::Error;

/// Result type alias using ScheduleError.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors raised by the spaced repetition scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("invalid quality {0}: expected a value between 0 and 5")]
    InvalidQuality(i32),

    #[error("invalid card state: {0}")]
    InvalidCardState(String),

    #[error("next review after {interval} days is past the supported calendar range")]
    DateOutOfRange { interval: i64 },
}

/// Errors raised by the kana and number reference tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("number {value} is outside the supported range 0..={max}")]
    OutOfRange { value: u64, max: u64 },
}

/// Errors raised while playing a mini-game session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game session is already finished")]
    Finished,

    #[error("not enough material to build a game: need {needed}, have {available}")]
    NotEnoughMaterial { needed: usize, available: usize },

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}
