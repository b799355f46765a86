//! Spaced repetition algorithm implementations.

pub mod sm2;

use crate::error::Result;
use crate::types::{ReviewCard, ScheduleOutcome};
use chrono::{DateTime, Utc};

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate the next review after a review of the given quality (0-5).
    fn schedule(&self, card: &ReviewCard, quality: i32, now: DateTime<Utc>) -> Result<ScheduleOutcome>;

    /// Initial state for a new card, due immediately.
    fn initial_card(&self, id: String, word_id: String, now: DateTime<Utc>) -> ReviewCard;
}

/// Get algorithm by name.
pub fn get_algorithm(name: &str) -> Option<Box<dyn SpacedRepetitionAlgorithm>> {
    match name {
        "sm2" => Some(Box::new(sm2::Sm2::default())),
        _ => None,
    }
}
