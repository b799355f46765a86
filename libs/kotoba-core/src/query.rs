//! Paginated word library queries.
//!
//! The same contract is served in memory by [`paginate`] and by the SQLite
//! store, so both must agree on filtering, ordering and slicing.

use crate::types::VocabularyEntry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default page size for library browsing.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Sort order for the word library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordSort {
    NewestFirst,
    OldestFirst,
    Alphabetical,
    ProgressAscending,
    DifficultyDescending,
}

impl Default for WordSort {
    fn default() -> Self {
        Self::NewestFirst
    }
}

/// Filter, sort and window over the word library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default)]
    pub favorites_only: bool,
    #[serde(default)]
    pub difficult_only: bool,
    #[serde(default)]
    pub sort: WordSort,
    #[serde(default)]
    pub offset: usize,
    pub limit: usize,
}

impl Default for WordQuery {
    fn default() -> Self {
        Self {
            search: None,
            difficulty: None,
            favorites_only: false,
            difficult_only: false,
            sort: WordSort::default(),
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl WordQuery {
    /// Query for the page at `page` (zero-based) with the given size.
    pub fn page(page: usize, size: usize) -> Self {
        Self {
            offset: page.saturating_mul(size),
            limit: size,
            ..Self::default()
        }
    }

    /// Trimmed, lower-cased search term, if any.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether an entry passes the query's filters.
    pub fn matches(&self, entry: &VocabularyEntry) -> bool {
        if self.favorites_only && !entry.is_favorite {
            return false;
        }
        if self.difficult_only && !entry.is_marked_difficult {
            return false;
        }
        if let Some(difficulty) = self.difficulty {
            if entry.difficulty != difficulty {
                return false;
            }
        }
        match self.search_term() {
            Some(term) => [
                Some(entry.text.as_str()),
                entry.reading.as_deref(),
                Some(entry.definition.as_str()),
                Some(entry.translation.as_str()),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term)),
            None => true,
        }
    }

    /// Ordering used by this query; ties fall back to the entry id.
    pub fn compare(&self, a: &VocabularyEntry, b: &VocabularyEntry) -> Ordering {
        let primary = match self.sort {
            WordSort::NewestFirst => b.date_added.cmp(&a.date_added),
            WordSort::OldestFirst => a.date_added.cmp(&b.date_added),
            WordSort::Alphabetical => a.text.cmp(&b.text),
            WordSort::ProgressAscending => a
                .progress
                .partial_cmp(&b.progress)
                .unwrap_or(Ordering::Equal),
            WordSort::DifficultyDescending => b.difficulty.cmp(&a.difficulty),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of matches before slicing.
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, offset: usize, limit: usize) -> Self {
        let has_more = offset.saturating_add(items.len()) < total;
        Self {
            items,
            total,
            offset,
            limit,
            has_more,
        }
    }

    pub fn empty(offset: usize, limit: usize) -> Self {
        Self::new(Vec::new(), 0, offset, limit)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            has_more: self.has_more,
        }
    }
}

/// Run a query over an in-memory slice of entries.
pub fn paginate(entries: &[VocabularyEntry], query: &WordQuery) -> Page<VocabularyEntry> {
    let mut matched: Vec<&VocabularyEntry> = entries.iter().filter(|e| query.matches(e)).collect();
    matched.sort_by(|a, b| query.compare(a, b));

    let total = matched.len();
    let items = matched
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .cloned()
        .collect();

    Page::new(items, total, query.offset, query.limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn library() -> Vec<VocabularyEntry> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let words = [
            ("w1", "猫", "ねこ", "cat", 1, 80.0, true, false),
            ("w2", "犬", "いぬ", "dog", 2, 20.0, false, true),
            ("w3", "鳥", "とり", "bird", 3, 50.0, true, true),
            ("w4", "魚", "さかな", "fish", 2, 10.0, false, false),
            ("w5", "馬", "うま", "horse", 5, 90.0, false, false),
        ];
        words
            .iter()
            .enumerate()
            .map(|(i, (id, text, reading, meaning, difficulty, progress, fav, hard))| {
                let mut e = VocabularyEntry::new(*id, *text, base + Duration::days(i as i64));
                e.reading = Some(reading.to_string());
                e.translation = meaning.to_string();
                e.difficulty = *difficulty;
                e.progress = *progress;
                e.is_favorite = *fav;
                e.is_marked_difficult = *hard;
                e
            })
            .collect()
    }

    fn ids(page: &Page<VocabularyEntry>) -> Vec<&str> {
        page.items.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn newest_first_by_default() {
        let page = paginate(&library(), &WordQuery::default());
        assert_eq!(ids(&page), vec!["w5", "w4", "w3", "w2", "w1"]);
        assert_eq!(page.total, 5);
        assert!(!page.has_more);
    }

    #[test]
    fn pages_slice_in_order() {
        let entries = library();
        let first = paginate(&entries, &WordQuery::page(0, 2));
        let second = paginate(&entries, &WordQuery::page(1, 2));
        let third = paginate(&entries, &WordQuery::page(2, 2));

        assert_eq!(ids(&first), vec!["w5", "w4"]);
        assert!(first.has_more);
        assert_eq!(ids(&second), vec!["w3", "w2"]);
        assert!(second.has_more);
        assert_eq!(ids(&third), vec!["w1"]);
        assert!(!third.has_more);
    }

    #[test]
    fn offset_past_end_keeps_total() {
        let page = paginate(&library(), &WordQuery::page(10, 2));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert!(!page.has_more);
    }

    #[test]
    fn zero_limit_is_empty() {
        let query = WordQuery { limit: 0, ..WordQuery::default() };
        let page = paginate(&library(), &query);
        assert!(page.items.is_empty());
        assert!(page.has_more);
    }

    #[test]
    fn filters_combine() {
        let query = WordQuery {
            favorites_only: true,
            difficult_only: true,
            ..WordQuery::default()
        };
        assert_eq!(ids(&paginate(&library(), &query)), vec!["w3"]);

        let query = WordQuery {
            difficulty: Some(2),
            sort: WordSort::ProgressAscending,
            ..WordQuery::default()
        };
        assert_eq!(ids(&paginate(&library(), &query)), vec!["w4", "w2"]);
    }

    #[test]
    fn search_matches_any_text_field() {
        let by_reading = WordQuery {
            search: Some(" ねこ ".to_string()),
            ..WordQuery::default()
        };
        assert_eq!(ids(&paginate(&library(), &by_reading)), vec!["w1"]);

        let by_meaning = WordQuery {
            search: Some("HOR".to_string()),
            ..WordQuery::default()
        };
        assert_eq!(ids(&paginate(&library(), &by_meaning)), vec!["w5"]);

        let blank = WordQuery {
            search: Some("   ".to_string()),
            ..WordQuery::default()
        };
        assert_eq!(paginate(&library(), &blank).total, 5);
    }

    #[test]
    fn difficulty_sort_breaks_ties_by_id() {
        let query = WordQuery {
            sort: WordSort::DifficultyDescending,
            ..WordQuery::default()
        };
        assert_eq!(ids(&paginate(&library(), &query)), vec!["w5", "w3", "w2", "w4", "w1"]);
    }
}
