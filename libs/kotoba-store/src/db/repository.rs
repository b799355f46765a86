//! Repository pattern for database access.

use crate::db::date_utils::{from_db_time, study_day, study_day_string, to_db_time};
use crate::db::error::DbError;
use chrono::{DateTime, Duration, Utc};
use kotoba_core::algorithm::SpacedRepetitionAlgorithm;
use kotoba_core::query::{Page, WordQuery, WordSort};
use kotoba_core::types::{ReviewCard, VocabularyEntry, MAX_DIFFICULTY, MIN_DIFFICULTY};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, DbError>;

/// Progress at or above which a word counts as mastered.
pub const MASTERED_PROGRESS: f64 = 80.0;

/// Fields supplied when a word is added to the library.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct NewWord {
    pub text: String,
    #[serde(default)]
    pub reading: Option<String>,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub translation: String,
    pub difficulty: u8,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Repository for the word library.
pub trait WordRepository {
    fn add_word(&self, word: &NewWord, now: DateTime<Utc>) -> Result<VocabularyEntry>;
    fn get_word(&self, id: &str) -> Result<Option<VocabularyEntry>>;
    fn update_word(&self, word: &VocabularyEntry) -> Result<()>;
    fn delete_word(&self, id: &str) -> Result<()>;
    fn set_favorite(&self, id: &str, favorite: bool) -> Result<()>;
    fn set_marked_difficult(&self, id: &str, difficult: bool) -> Result<()>;
    fn record_word_review(&self, id: &str, progress_delta: f64) -> Result<VocabularyEntry>;
    fn all_words(&self) -> Result<Vec<VocabularyEntry>>;
    fn list_words(&self, query: &WordQuery) -> Result<Page<VocabularyEntry>>;
}

/// Repository for flashcard scheduling state.
pub trait CardRepository {
    fn create_card(
        &self,
        word_id: &str,
        algorithm: &dyn SpacedRepetitionAlgorithm,
        now: DateTime<Utc>,
    ) -> Result<ReviewCard>;
    fn get_card(&self, id: &str) -> Result<Option<ReviewCard>>;
    fn card_for_word(&self, word_id: &str) -> Result<Option<ReviewCard>>;
    fn save_card(&self, card: &ReviewCard) -> Result<()>;
    fn due_cards(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ReviewCard>>;
    fn delete_card(&self, id: &str) -> Result<()>;
}

/// One completed flashcard review.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReviewLogEntry {
    pub card_id: String,
    pub word_id: String,
    pub reviewed_at: DateTime<Utc>,
    pub quality: i32,
    pub interval_before: i64,
    pub interval_after: i64,
    pub ease_before: f64,
    pub ease_after: f64,
}

/// Overall study statistics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StudyStats {
    pub total_words: usize,
    pub favorite_words: usize,
    pub difficult_words: usize,
    pub mastered_words: usize,
    pub average_progress: f64,
    pub due_cards: usize,
    pub reviews_today: usize,
    pub total_reviews: usize,
    pub streak_days: usize,
    pub retention_rate: f64,
}

/// Calendar data point.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CalendarData {
    pub date: String,
    pub reviews: usize,
}

/// Repository for review history and statistics.
pub trait StatsRepository {
    fn log_review(&self, entry: &ReviewLogEntry, daily_reset_hour: u32) -> Result<i64>;
    fn study_stats(&self, now: DateTime<Utc>, daily_reset_hour: u32) -> Result<StudyStats>;
    fn review_calendar(
        &self,
        days: usize,
        now: DateTime<Utc>,
        daily_reset_hour: u32,
    ) -> Result<Vec<CalendarData>>;
}

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

const WORD_COLUMNS: &str = "id, text, reading, definition, translation, difficulty, progress, \
     review_count, date_added, is_marked_difficult, is_favorite, tags";

const CARD_COLUMNS: &str = "id, word_id, interval_days, ease_factor, review_count, next_review";

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!(path = %path.display(), "opening word store");
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(super::schema::SCHEMA)?;
        self.conn.execute_batch(super::schema::INIT_SCHEMA_VERSION)?;
        debug!(version = super::schema::SCHEMA_VERSION, "schema ready");
        Ok(())
    }

    /// Add a word and create its flashcard in one transaction.
    pub fn add_word_with_card(
        &self,
        word: &NewWord,
        algorithm: &dyn SpacedRepetitionAlgorithm,
        now: DateTime<Utc>,
    ) -> Result<(VocabularyEntry, ReviewCard)> {
        let tx = self.conn.unchecked_transaction()?;
        let entry = self.add_word(word, now)?;
        let card = self.create_card(&entry.id, algorithm, now)?;
        tx.commit()?;
        Ok((entry, card))
    }

    /// Save a rescheduled card, its log row and the word's progress in one
    /// transaction.
    pub fn record_review(
        &self,
        card: &ReviewCard,
        entry: &ReviewLogEntry,
        progress_delta: f64,
        daily_reset_hour: u32,
    ) -> Result<VocabularyEntry> {
        let tx = self.conn.unchecked_transaction()?;
        self.save_card(card)?;
        self.log_review(entry, daily_reset_hour)?;
        let word = self.record_word_review(&entry.word_id, progress_delta)?;
        tx.commit()?;
        Ok(word)
    }

    fn row_to_word(row: &rusqlite::Row) -> rusqlite::Result<VocabularyEntry> {
        let date_added: String = row.get(8)?;
        let tags: String = row.get(11)?;
        Ok(VocabularyEntry {
            id: row.get(0)?,
            text: row.get(1)?,
            reading: row.get(2)?,
            definition: row.get(3)?,
            translation: row.get(4)?,
            difficulty: row.get(5)?,
            progress: row.get(6)?,
            review_count: row.get(7)?,
            date_added: parse_time(8, &date_added)?,
            is_marked_difficult: row.get(9)?,
            is_favorite: row.get(10)?,
            tags: serde_json::from_str(&tags)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?,
        })
    }

    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<ReviewCard> {
        let next_review: String = row.get(5)?;
        Ok(ReviewCard {
            id: row.get(0)?,
            word_id: row.get(1)?,
            interval: row.get(2)?,
            ease_factor: row.get(3)?,
            review_count: row.get(4)?,
            next_review: parse_time(5, &next_review)?,
        })
    }

    fn require_word(&self, changed: usize, id: &str) -> Result<()> {
        if changed == 0 {
            return Err(DbError::WordNotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_time(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    from_db_time(value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {value}").into(),
        )
    })
}

fn validate_difficulty(difficulty: u8) -> Result<()> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(DbError::InvalidData(format!(
            "difficulty must be between {MIN_DIFFICULTY} and {MAX_DIFFICULTY}, got {difficulty}"
        )));
    }
    Ok(())
}

/// WHERE clause and its parameters for a word query.
fn word_filter(query: &WordQuery) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    if query.favorites_only {
        clauses.push("is_favorite = 1".to_string());
    }
    if query.difficult_only {
        clauses.push("is_marked_difficult = 1".to_string());
    }
    if let Some(difficulty) = query.difficulty {
        clauses.push("difficulty = ?".to_string());
        values.push(Value::Integer(i64::from(difficulty)));
    }
    if let Some(term) = query.search_term() {
        let fields = ["text", "COALESCE(reading, '')", "definition", "translation"];
        let any = fields
            .iter()
            .map(|field| format!("instr(lower({field}), ?) > 0"))
            .collect::<Vec<_>>()
            .join(" OR ");
        clauses.push(format!("({any})"));
        values.extend(fields.iter().map(|_| Value::Text(term.clone())));
    }

    let sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (sql, values)
}

fn word_order(sort: WordSort) -> &'static str {
    match sort {
        WordSort::NewestFirst => "date_added DESC, id ASC",
        WordSort::OldestFirst => "date_added ASC, id ASC",
        WordSort::Alphabetical => "text ASC, id ASC",
        WordSort::ProgressAscending => "progress ASC, id ASC",
        WordSort::DifficultyDescending => "difficulty DESC, id ASC",
    }
}

fn to_sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl WordRepository for SqliteRepository {
    fn add_word(&self, word: &NewWord, now: DateTime<Utc>) -> Result<VocabularyEntry> {
        if word.text.trim().is_empty() {
            return Err(DbError::InvalidData("word text must not be empty".to_string()));
        }
        validate_difficulty(word.difficulty)?;

        let entry = VocabularyEntry {
            id: uuid::Uuid::new_v4().to_string(),
            text: word.text.trim().to_string(),
            reading: word.reading.clone().filter(|r| !r.trim().is_empty()),
            definition: word.definition.clone(),
            translation: word.translation.clone(),
            difficulty: word.difficulty,
            progress: 0.0,
            review_count: 0,
            date_added: now,
            is_marked_difficult: false,
            is_favorite: word.is_favorite,
            tags: word.tags.clone(),
        };

        self.conn.execute(
            &format!("INSERT INTO words ({WORD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"),
            params![
                entry.id,
                entry.text,
                entry.reading,
                entry.definition,
                entry.translation,
                entry.difficulty,
                entry.progress,
                entry.review_count,
                to_db_time(entry.date_added)?,
                entry.is_marked_difficult,
                entry.is_favorite,
                serde_json::to_string(&entry.tags)?,
            ],
        )?;
        debug!(id = %entry.id, text = %entry.text, "word added");
        Ok(entry)
    }

    fn get_word(&self, id: &str) -> Result<Option<VocabularyEntry>> {
        self.conn
            .query_row(
                &format!("SELECT {WORD_COLUMNS} FROM words WHERE id = ?1"),
                params![id],
                Self::row_to_word,
            )
            .optional()
            .map_err(Into::into)
    }

    fn update_word(&self, word: &VocabularyEntry) -> Result<()> {
        validate_difficulty(word.difficulty)?;
        let changed = self.conn.execute(
            "UPDATE words SET text = ?2, reading = ?3, definition = ?4, translation = ?5,
                difficulty = ?6, progress = ?7, review_count = ?8, is_marked_difficult = ?9,
                is_favorite = ?10, tags = ?11
             WHERE id = ?1",
            params![
                word.id,
                word.text,
                word.reading,
                word.definition,
                word.translation,
                word.difficulty,
                word.progress.clamp(0.0, 100.0),
                word.review_count,
                word.is_marked_difficult,
                word.is_favorite,
                serde_json::to_string(&word.tags)?,
            ],
        )?;
        self.require_word(changed, &word.id)
    }

    fn delete_word(&self, id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM review_log WHERE word_id = ?1", params![id])?;
        tx.execute("DELETE FROM review_cards WHERE word_id = ?1", params![id])?;
        let changed = tx.execute("DELETE FROM words WHERE id = ?1", params![id])?;
        self.require_word(changed, id)?;
        tx.commit()?;
        debug!(id, "word deleted");
        Ok(())
    }

    fn set_favorite(&self, id: &str, favorite: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE words SET is_favorite = ?2 WHERE id = ?1",
            params![id, favorite],
        )?;
        self.require_word(changed, id)
    }

    fn set_marked_difficult(&self, id: &str, difficult: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE words SET is_marked_difficult = ?2 WHERE id = ?1",
            params![id, difficult],
        )?;
        self.require_word(changed, id)
    }

    fn record_word_review(&self, id: &str, progress_delta: f64) -> Result<VocabularyEntry> {
        let changed = self.conn.execute(
            "UPDATE words
             SET review_count = review_count + 1,
                 progress = MIN(100.0, MAX(0.0, progress + ?2))
             WHERE id = ?1",
            params![id, progress_delta],
        )?;
        self.require_word(changed, id)?;
        self.get_word(id)?
            .ok_or_else(|| DbError::WordNotFound(id.to_string()))
    }

    fn all_words(&self) -> Result<Vec<VocabularyEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {WORD_COLUMNS} FROM words ORDER BY date_added ASC, id ASC"))?;
        let words = stmt
            .query_map([], Self::row_to_word)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(words)
    }

    fn list_words(&self, query: &WordQuery) -> Result<Page<VocabularyEntry>> {
        let (filter, mut values) = word_filter(query);

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM words {filter}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        values.push(Value::Integer(to_sql_count(query.limit)));
        values.push(Value::Integer(to_sql_count(query.offset)));
        let sql = format!(
            "SELECT {WORD_COLUMNS} FROM words {filter} ORDER BY {} LIMIT ? OFFSET ?",
            word_order(query.sort)
        );
        debug!(%sql, total, "listing words");

        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_word)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total as usize, query.offset, query.limit))
    }
}

impl CardRepository for SqliteRepository {
    fn create_card(
        &self,
        word_id: &str,
        algorithm: &dyn SpacedRepetitionAlgorithm,
        now: DateTime<Utc>,
    ) -> Result<ReviewCard> {
        if self.get_word(word_id)?.is_none() {
            return Err(DbError::WordNotFound(word_id.to_string()));
        }
        let card = algorithm.initial_card(uuid::Uuid::new_v4().to_string(), word_id.to_string(), now);
        self.conn.execute(
            &format!("INSERT INTO review_cards ({CARD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                card.id,
                card.word_id,
                card.interval,
                card.ease_factor,
                card.review_count,
                to_db_time(card.next_review)?,
            ],
        )?;
        Ok(card)
    }

    fn get_card(&self, id: &str) -> Result<Option<ReviewCard>> {
        self.conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM review_cards WHERE id = ?1"),
                params![id],
                Self::row_to_card,
            )
            .optional()
            .map_err(Into::into)
    }

    fn card_for_word(&self, word_id: &str) -> Result<Option<ReviewCard>> {
        self.conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM review_cards WHERE word_id = ?1"),
                params![word_id],
                Self::row_to_card,
            )
            .optional()
            .map_err(Into::into)
    }

    fn save_card(&self, card: &ReviewCard) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE review_cards
             SET interval_days = ?2, ease_factor = ?3, review_count = ?4, next_review = ?5
             WHERE id = ?1",
            params![
                card.id,
                card.interval,
                card.ease_factor,
                card.review_count,
                to_db_time(card.next_review)?,
            ],
        )?;
        if changed == 0 {
            return Err(DbError::CardNotFound(card.id.clone()));
        }
        Ok(())
    }

    fn due_cards(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ReviewCard>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM review_cards
             WHERE next_review <= ?1
             ORDER BY next_review, id
             LIMIT ?2"
        ))?;
        let cards = stmt
            .query_map(params![to_db_time(now)?, to_sql_count(limit)], Self::row_to_card)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    fn delete_card(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM review_cards WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DbError::CardNotFound(id.to_string()));
        }
        Ok(())
    }
}

impl StatsRepository for SqliteRepository {
    fn log_review(&self, entry: &ReviewLogEntry, daily_reset_hour: u32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO review_log (card_id, word_id, reviewed_at, study_day, quality,
                interval_before, interval_after, ease_before, ease_after)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.card_id,
                entry.word_id,
                to_db_time(entry.reviewed_at)?,
                study_day_string(entry.reviewed_at, daily_reset_hour),
                entry.quality,
                entry.interval_before,
                entry.interval_after,
                entry.ease_before,
                entry.ease_after,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn study_stats(&self, now: DateTime<Utc>, daily_reset_hour: u32) -> Result<StudyStats> {
        let today_date = study_day(now, daily_reset_hour);
        let today = study_day_string(now, daily_reset_hour);

        let (total_words, favorite_words, difficult_words, mastered_words, average_progress) =
            self.conn.query_row(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(is_favorite), 0),
                    COALESCE(SUM(is_marked_difficult), 0),
                    COALESCE(SUM(CASE WHEN progress >= ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(AVG(progress), 0.0)
                 FROM words",
                params![MASTERED_PROGRESS],
                |row| {
                    Ok((
                        row.get::<_, usize>(0)?,
                        row.get::<_, usize>(1)?,
                        row.get::<_, usize>(2)?,
                        row.get::<_, usize>(3)?,
                        row.get::<_, f64>(4)?,
                    ))
                },
            )?;

        let due_cards: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM review_cards WHERE next_review <= ?1",
            params![to_db_time(now)?],
            |row| row.get(0),
        )?;

        let reviews_today: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM review_log WHERE study_day = ?1",
            params![today],
            |row| row.get(0),
        )?;

        // Retention counts reviews with passing quality
        let (total_reviews, retention_rate): (usize, f64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(
                CAST(SUM(CASE WHEN quality >= 3 THEN 1 ELSE 0 END) AS REAL) / NULLIF(COUNT(*), 0),
                0.0
             ) FROM review_log",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        // Calculate streak (consecutive study days with reviews)
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT study_day FROM review_log WHERE study_day <= ?1 ORDER BY study_day DESC")?;
        let days = stmt
            .query_map(params![today], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut streak_days = 0usize;
        let mut expected = today_date;
        for day in days {
            let day = chrono::NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|e| DbError::InvalidData(format!("bad study day {day}: {e}")))?;
            if day == expected {
                streak_days += 1;
            } else if streak_days == 0 && Some(day) == today_date.pred_opt() {
                // Allow for today not having reviews yet
                streak_days = 1;
                expected = day;
            } else {
                break;
            }
            expected = match expected.pred_opt() {
                Some(prev) => prev,
                None => break,
            };
        }

        Ok(StudyStats {
            total_words,
            favorite_words,
            difficult_words,
            mastered_words,
            average_progress,
            due_cards,
            reviews_today,
            total_reviews,
            streak_days,
            retention_rate,
        })
    }

    fn review_calendar(
        &self,
        days: usize,
        now: DateTime<Utc>,
        daily_reset_hour: u32,
    ) -> Result<Vec<CalendarData>> {
        let today = study_day(now, daily_reset_hour);
        let mut stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM review_log WHERE study_day = ?1")?;

        let mut data = Vec::with_capacity(days);
        for i in 0..days {
            let date = today - Duration::days(i as i64);
            let date_str = date.format("%Y-%m-%d").to_string();
            let reviews: usize = stmt.query_row(params![date_str], |row| row.get(0))?;
            data.push(CalendarData {
                date: date_str,
                reviews,
            });
        }

        // Reverse so oldest is first
        data.reverse();
        Ok(data)
    }
}
