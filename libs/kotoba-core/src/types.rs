//! Core types for the vocabulary learning core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest allowed difficulty for a vocabulary entry.
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest allowed difficulty for a vocabulary entry.
pub const MAX_DIFFICULTY: u8 = 5;

/// A word in the user's library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub translation: String,
    pub difficulty: u8,
    /// Mastery percentage in 0..=100, maintained by the caller.
    pub progress: f64,
    pub review_count: u32,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub is_marked_difficult: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl VocabularyEntry {
    /// Create an entry with default bookkeeping fields.
    pub fn new(id: impl Into<String>, text: impl Into<String>, date_added: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            reading: None,
            definition: String::new(),
            translation: String::new(),
            difficulty: MIN_DIFFICULTY,
            progress: 0.0,
            review_count: 0,
            date_added,
            is_marked_difficult: false,
            is_favorite: false,
            tags: Vec::new(),
        }
    }

    /// An entry can be practiced once it has something to be quizzed on.
    pub fn is_eligible(&self) -> bool {
        !self.definition.trim().is_empty() || !self.translation.trim().is_empty()
    }

    /// The meaning shown as the answer side: definition first, translation as fallback.
    pub fn meaning(&self) -> &str {
        if self.definition.trim().is_empty() {
            self.translation.trim()
        } else {
            self.definition.trim()
        }
    }
}

/// Spaced repetition state for a flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewCard {
    pub id: String,
    pub word_id: String,
    /// Days until the next review.
    pub interval: i64,
    pub ease_factor: f64,
    pub review_count: i64,
    pub next_review: DateTime<Utc>,
}

impl ReviewCard {
    /// Copy a scheduling outcome onto the card and count the review.
    pub fn apply(&self, outcome: &ScheduleOutcome) -> Self {
        Self {
            id: self.id.clone(),
            word_id: self.word_id.clone(),
            interval: outcome.interval,
            ease_factor: outcome.ease_factor,
            review_count: self.review_count + 1,
            next_review: outcome.next_review,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

/// Result of scheduling a card after review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub next_review: DateTime<Utc>,
    pub interval: i64,
    pub ease_factor: f64,
}

/// Button rating offered after a flashcard review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// SM-2 recall quality (0-5) for this rating.
    pub fn to_quality(self) -> i32 {
        match self {
            Self::Again => 1,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    /// Right/wrong answers from a game count as Good/Again.
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::Good } else { Self::Again }
    }
}

/// Matching mode for typed answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    Exact,
    CaseInsensitive,
    Fuzzy,
}

impl Default for MatchingMode {
    fn default() -> Self {
        Self::Fuzzy
    }
}
