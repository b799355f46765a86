//! Common test utilities for store integration tests.
//!
//! Every test gets its own in-memory database, so tests can run in parallel.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use kotoba_core::algorithm::sm2::Sm2;
use kotoba_core::cache::QueryCache;
use kotoba_store::{NewWord, SqliteRepository, StudyService, StudySettings};

/// Fixed reference time for deterministic tests.
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, day, hour, 0, 0).unwrap()
}

/// Study service over a fresh in-memory database.
pub fn service() -> StudyService {
    let repository = SqliteRepository::open_in_memory().expect("open in-memory database");
    StudyService::new(
        repository,
        Box::new(Sm2::default()),
        QueryCache::new(16, chrono::Duration::seconds(60)),
        StudySettings {
            daily_reset_hour: 0,
            session_size: 3,
        },
    )
}

pub fn word(text: &str, translation: &str, difficulty: u8) -> NewWord {
    NewWord {
        text: text.to_string(),
        translation: translation.to_string(),
        difficulty,
        ..NewWord::default()
    }
}

/// A small library of animal words added on consecutive days.
pub fn sample_words() -> Vec<NewWord> {
    vec![
        word("猫", "cat", 1),
        word("犬", "dog", 2),
        word("鳥", "bird", 3),
        word("魚", "fish", 4),
        word("馬", "horse", 5),
    ]
}
