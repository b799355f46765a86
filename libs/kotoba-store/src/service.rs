//! Study service: the orchestration between the store and the core algorithms.
//!
//! Computes the next state with kotoba-core, then persists it.

use crate::config::StoreConfig;
use crate::db::{
    CalendarData, CardRepository, DbError, NewWord, ReviewLogEntry, SqliteRepository,
    StatsRepository, StudyStats, WordRepository,
};
use chrono::{DateTime, Duration, Utc};
use kotoba_core::algorithm::SpacedRepetitionAlgorithm;
use kotoba_core::cache::QueryCache;
use kotoba_core::games::{GameSession, Outcome};
use kotoba_core::practice::select_practice_items;
use kotoba_core::query::{Page, WordQuery};
use kotoba_core::types::{Rating, ReviewCard, VocabularyEntry};
use kotoba_core::ScheduleError;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Progress change per quality point above or below 2.
const PROGRESS_PER_QUALITY: f64 = 5.0;
/// Progress change for a game answer.
const GAME_PROGRESS_STEP: f64 = 5.0;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Settings the service needs at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudySettings {
    pub daily_reset_hour: u32,
    pub session_size: usize,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            daily_reset_hour: 0,
            session_size: 20,
        }
    }
}

impl From<&StoreConfig> for StudySettings {
    fn from(config: &StoreConfig) -> Self {
        Self {
            daily_reset_hour: config.daily_reset_hour,
            session_size: config.session_size,
        }
    }
}

/// A due flashcard with its word.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DueReview {
    pub card: ReviewCard,
    pub word: VocabularyEntry,
}

pub struct StudyService {
    repository: SqliteRepository,
    algorithm: Box<dyn SpacedRepetitionAlgorithm>,
    pages: QueryCache<WordQuery, Page<VocabularyEntry>>,
    settings: StudySettings,
}

impl StudyService {
    pub fn new(
        repository: SqliteRepository,
        algorithm: Box<dyn SpacedRepetitionAlgorithm>,
        pages: QueryCache<WordQuery, Page<VocabularyEntry>>,
        settings: StudySettings,
    ) -> Self {
        Self {
            repository,
            algorithm,
            pages,
            settings,
        }
    }

    /// Build a service from configuration, opening the database it names.
    pub fn from_config(
        config: &StoreConfig,
        algorithm: Box<dyn SpacedRepetitionAlgorithm>,
    ) -> Result<Self> {
        let repository = SqliteRepository::open(&config.database_path)?;
        let pages = QueryCache::new(config.cache_capacity, Duration::seconds(config.cache_ttl_secs));
        info!(algorithm = algorithm.name(), "study service ready");
        Ok(Self::new(repository, algorithm, pages, StudySettings::from(config)))
    }

    pub fn repository(&self) -> &SqliteRepository {
        &self.repository
    }

    pub fn settings(&self) -> StudySettings {
        self.settings
    }

    /// Add a word together with its flashcard.
    pub fn add_word(&mut self, word: &NewWord, now: DateTime<Utc>) -> Result<VocabularyEntry> {
        let (entry, _) = self
            .repository
            .add_word_with_card(word, self.algorithm.as_ref(), now)?;
        self.pages.invalidate_all();
        Ok(entry)
    }

    pub fn update_word(&mut self, word: &VocabularyEntry) -> Result<()> {
        self.repository.update_word(word)?;
        self.pages.invalidate_all();
        Ok(())
    }

    pub fn delete_word(&mut self, id: &str) -> Result<()> {
        self.repository.delete_word(id)?;
        self.pages.invalidate_all();
        Ok(())
    }

    pub fn set_favorite(&mut self, id: &str, favorite: bool) -> Result<()> {
        self.repository.set_favorite(id, favorite)?;
        self.pages.invalidate_all();
        Ok(())
    }

    pub fn set_marked_difficult(&mut self, id: &str, difficult: bool) -> Result<()> {
        self.repository.set_marked_difficult(id, difficult)?;
        self.pages.invalidate_all();
        Ok(())
    }

    /// One page of the word library, served from the cache when fresh.
    pub fn browse(&mut self, query: &WordQuery, now: DateTime<Utc>) -> Result<Page<VocabularyEntry>> {
        if let Some(page) = self.pages.get(query, now) {
            debug!(offset = query.offset, "word page cache hit");
            return Ok(page);
        }
        let page = self.repository.list_words(query)?;
        self.pages.insert(query.clone(), page.clone(), now);
        Ok(page)
    }

    /// Words for a practice session, most in need of practice first.
    ///
    /// `count` falls back to the configured session size.
    pub fn start_practice(
        &self,
        count: Option<usize>,
        difficulty: Option<u8>,
        now: DateTime<Utc>,
    ) -> Result<Vec<VocabularyEntry>> {
        let words = self.repository.all_words()?;
        let count = count.unwrap_or(self.settings.session_size);
        let selected: Vec<VocabularyEntry> = select_practice_items(&words, count, difficulty, now)
            .into_iter()
            .cloned()
            .collect();
        debug!(requested = count, selected = selected.len(), "practice session");
        Ok(selected)
    }

    /// Flashcards due for review, oldest due first.
    pub fn due_reviews(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<DueReview>> {
        let cards = self.repository.due_cards(now, limit)?;
        let mut due = Vec::with_capacity(cards.len());
        for card in cards {
            let word = self
                .repository
                .get_word(&card.word_id)?
                .ok_or_else(|| DbError::WordNotFound(card.word_id.clone()))?;
            due.push(DueReview { card, word });
        }
        Ok(due)
    }

    /// Record a flashcard review and reschedule the card.
    pub fn review(&mut self, card_id: &str, quality: i32, now: DateTime<Utc>) -> Result<ReviewCard> {
        let card = self
            .repository
            .get_card(card_id)?
            .ok_or_else(|| DbError::CardNotFound(card_id.to_string()))?;

        let outcome = self.algorithm.schedule(&card, quality, now).map_err(|e| {
            warn!(card_id, quality, error = %e, "review rejected");
            e
        })?;
        let updated = card.apply(&outcome);
        let entry = ReviewLogEntry {
            card_id: card.id.clone(),
            word_id: card.word_id.clone(),
            reviewed_at: now,
            quality,
            interval_before: card.interval,
            interval_after: updated.interval,
            ease_before: card.ease_factor,
            ease_after: updated.ease_factor,
        };

        self.repository.record_review(
            &updated,
            &entry,
            f64::from(quality - 2) * PROGRESS_PER_QUALITY,
            self.settings.daily_reset_hour,
        )?;
        self.pages.invalidate_all();

        debug!(card_id, quality, interval = updated.interval, "card rescheduled");
        Ok(updated)
    }

    /// Record a review made with one of the four rating buttons.
    pub fn review_rating(
        &mut self,
        card_id: &str,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<ReviewCard> {
        self.review(card_id, rating.to_quality(), now)
    }

    /// Apply a finished word game to the library. Returns the number of words updated.
    pub fn record_game(&mut self, session: &GameSession) -> Result<usize> {
        let mut updated = 0;
        for (word_id, outcome) in session.word_results() {
            let delta = match outcome {
                Outcome::Correct => GAME_PROGRESS_STEP,
                Outcome::Wrong => -GAME_PROGRESS_STEP,
                Outcome::Skipped => continue,
            };
            match self.repository.record_word_review(word_id, delta) {
                Ok(_) => updated += 1,
                // The word may have been deleted while the game ran.
                Err(DbError::WordNotFound(id)) => warn!(word_id = %id, "game word no longer exists"),
                Err(e) => return Err(e.into()),
            }
        }
        if updated > 0 {
            self.pages.invalidate_all();
        }
        Ok(updated)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<StudyStats> {
        Ok(self.repository.study_stats(now, self.settings.daily_reset_hour)?)
    }

    pub fn calendar(&self, days: usize, now: DateTime<Utc>) -> Result<Vec<CalendarData>> {
        Ok(self
            .repository
            .review_calendar(days, now, self.settings.daily_reset_hour)?)
    }
}
