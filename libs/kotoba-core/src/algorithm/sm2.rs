//! SM-2 spaced repetition algorithm.
//!
//! Quality ratings (0-5):
//! - 0: complete blackout
//! - 1-2: incorrect, the schedule restarts
//! - 3: correct with serious difficulty
//! - 4: correct after hesitation
//! - 5: perfect recall

use super::SpacedRepetitionAlgorithm;
use crate::error::{Result, ScheduleError};
use crate::types::{ReviewCard, ScheduleOutcome};
use chrono::{DateTime, Duration, Utc};

/// Highest quality accepted by the scheduler.
pub const MAX_QUALITY: i32 = 5;
/// Lowest quality that still counts as a successful recall.
pub const PASSING_QUALITY: i32 = 3;

/// Longest interval the scheduler will produce, in days.
pub const MAXIMUM_INTERVAL: i64 = 36500;

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub first_interval: i64,
    pub second_interval: i64,
    pub maximum_interval: i64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            first_interval: 1,
            second_interval: 6,
            maximum_interval: MAXIMUM_INTERVAL,
        }
    }
}

/// Schedule a card with the default SM-2 parameters.
pub fn schedule_next_review(
    card: &ReviewCard,
    quality: i32,
    now: DateTime<Utc>,
) -> Result<ScheduleOutcome> {
    Sm2::default().schedule(card, quality, now)
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_card(&self, id: String, word_id: String, now: DateTime<Utc>) -> ReviewCard {
        ReviewCard {
            id,
            word_id,
            interval: self.first_interval,
            ease_factor: self.initial_ease,
            review_count: 0,
            next_review: now,
        }
    }

    fn schedule(&self, card: &ReviewCard, quality: i32, now: DateTime<Utc>) -> Result<ScheduleOutcome> {
        if !(0..=MAX_QUALITY).contains(&quality) {
            return Err(ScheduleError::InvalidQuality(quality));
        }
        self.validate(card)?;

        let interval = if quality < PASSING_QUALITY {
            self.first_interval
        } else {
            match card.review_count {
                0 => self.first_interval,
                1 => self.second_interval,
                _ => (card.interval as f64 * card.ease_factor).round() as i64,
            }
        };
        let interval = interval.min(self.maximum_interval).max(1);

        let ease_factor = self.next_ease(card.ease_factor, quality);
        let next_review = now
            .checked_add_signed(Duration::days(interval))
            .ok_or(ScheduleError::DateOutOfRange { interval })?;

        Ok(ScheduleOutcome {
            next_review,
            interval,
            ease_factor,
        })
    }
}

impl Sm2 {
    fn validate(&self, card: &ReviewCard) -> Result<()> {
        if card.interval <= 0 {
            return Err(ScheduleError::InvalidCardState(format!(
                "interval must be positive, got {}",
                card.interval
            )));
        }
        // Also rejects NaN.
        if !(card.ease_factor >= self.minimum_ease) || !card.ease_factor.is_finite() {
            return Err(ScheduleError::InvalidCardState(format!(
                "ease factor must be at least {}, got {}",
                self.minimum_ease, card.ease_factor
            )));
        }
        if card.review_count < 0 {
            return Err(ScheduleError::InvalidCardState(format!(
                "review count must not be negative, got {}",
                card.review_count
            )));
        }
        Ok(())
    }

    fn next_ease(&self, ease_factor: f64, quality: i32) -> f64 {
        let miss = f64::from(MAX_QUALITY - quality);
        let ease = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
        ease.max(self.minimum_ease)
    }
}
