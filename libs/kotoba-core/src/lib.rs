//! Core vocabulary learning library.
//!
//! Provides:
//! - Practice selection by deterministic weighting
//! - SM-2 spaced repetition scheduling
//! - Paginated word library queries
//! - Kana and number reference tables
//! - Answer matching and mini-game sessions
//! - Shared types (VocabularyEntry, ReviewCard, Rating, etc.)

pub mod algorithm;
pub mod cache;
pub mod error;
pub mod games;
pub mod matching;
pub mod practice;
pub mod query;
pub mod reference;
pub mod types;

pub use algorithm::sm2::{schedule_next_review, Sm2};
pub use algorithm::{get_algorithm, SpacedRepetitionAlgorithm};
pub use cache::QueryCache;
pub use error::{GameError, ReferenceError, Result, ScheduleError};
pub use games::{GameKind, GameSession, GameSummary, Outcome, Question};
pub use matching::{check_answer, levenshtein_distance, normalized_similarity, AnswerCheck};
pub use practice::{practice_weight, rank_practice_items, select_practice_items, ScoredEntry};
pub use query::{paginate, Page, WordQuery, WordSort};
pub use types::{MatchingMode, Rating, ReviewCard, ScheduleOutcome, VocabularyEntry};
