//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the local SQLite database.
///
/// Timestamps are RFC 3339 UTC strings with a fixed microsecond width so
/// that string order is chronological order.
pub const SCHEMA: &str = r#"
-- Word library
CREATE TABLE IF NOT EXISTS words (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    reading TEXT,
    definition TEXT NOT NULL DEFAULT '',
    translation TEXT NOT NULL DEFAULT '',
    difficulty INTEGER NOT NULL DEFAULT 1 CHECK (difficulty BETWEEN 1 AND 5),
    progress REAL NOT NULL DEFAULT 0,
    review_count INTEGER NOT NULL DEFAULT 0,
    date_added TEXT NOT NULL,
    is_marked_difficult INTEGER NOT NULL DEFAULT 0,
    is_favorite INTEGER NOT NULL DEFAULT 0,
    tags TEXT NOT NULL DEFAULT '[]'
);

-- Flashcard scheduling state, one card per word
CREATE TABLE IF NOT EXISTS review_cards (
    id TEXT PRIMARY KEY,
    word_id TEXT NOT NULL UNIQUE REFERENCES words(id),
    interval_days INTEGER NOT NULL DEFAULT 1,
    ease_factor REAL NOT NULL DEFAULT 2.5,
    review_count INTEGER NOT NULL DEFAULT 0,
    next_review TEXT NOT NULL
);

-- Review history
CREATE TABLE IF NOT EXISTS review_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id TEXT NOT NULL,
    word_id TEXT NOT NULL,
    reviewed_at TEXT NOT NULL,
    study_day TEXT NOT NULL,
    quality INTEGER NOT NULL,
    interval_before INTEGER NOT NULL,
    interval_after INTEGER NOT NULL,
    ease_before REAL NOT NULL,
    ease_after REAL NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_words_date_added ON words(date_added);
CREATE INDEX IF NOT EXISTS idx_review_cards_next ON review_cards(next_review);
CREATE INDEX IF NOT EXISTS idx_review_log_day ON review_log(study_day);
"#;

/// Record the schema version if not yet recorded.
pub const INIT_SCHEMA_VERSION: &str = r#"
INSERT OR IGNORE INTO schema_version (version) VALUES (1);
"#;
