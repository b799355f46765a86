//! Practice session selection.
//!
//! Every eligible entry gets a deterministic weight and the heaviest entries
//! are picked first. Ties keep their input order.

use crate::types::VocabularyEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

const BASE_WEIGHT: f64 = 100.0;
const PROGRESS_FACTOR: f64 = 0.5;
const REVIEW_CAP: u32 = 20;
const REVIEW_FACTOR: f64 = 2.0;
const DIFFICULTY_FACTOR: f64 = 5.0;
const RECENT_DAYS: i64 = 7;
const RECENCY_FACTOR: f64 = 10.0;
const MARKED_DIFFICULT_BONUS: f64 = 30.0;

/// An entry paired with its practice weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry<'a> {
    pub entry: &'a VocabularyEntry,
    pub weight: f64,
}

/// Practice weight of a single entry. Higher means practice sooner.
pub fn practice_weight(entry: &VocabularyEntry, now: DateTime<Utc>) -> f64 {
    let mut weight = BASE_WEIGHT;

    weight += (100.0 - entry.progress) * PROGRESS_FACTOR;
    weight += f64::from(REVIEW_CAP.saturating_sub(entry.review_count)) * REVIEW_FACTOR;
    weight += f64::from(entry.difficulty) * DIFFICULTY_FACTOR;

    // Entries dated in the future count as added today.
    let age_days = (now - entry.date_added).num_days().max(0);
    if age_days < RECENT_DAYS {
        weight += (RECENT_DAYS - age_days) as f64 * RECENCY_FACTOR;
    }

    if entry.is_marked_difficult {
        weight += MARKED_DIFFICULT_BONUS;
    }

    weight
}

/// Weigh every eligible entry and order them heaviest first.
pub fn rank_practice_items<'a>(
    entries: &'a [VocabularyEntry],
    difficulty_filter: Option<u8>,
    now: DateTime<Utc>,
) -> Vec<ScoredEntry<'a>> {
    let mut scored: Vec<ScoredEntry<'a>> = entries
        .iter()
        .filter(|entry| entry.is_eligible())
        .filter(|entry| difficulty_filter.map_or(true, |d| entry.difficulty == d))
        .map(|entry| ScoredEntry {
            entry,
            weight: practice_weight(entry, now),
        })
        .collect();

    // sort_by is stable, so equal weights keep input order
    scored.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    scored
}

/// Pick up to `count` entries for a practice session.
pub fn select_practice_items<'a>(
    entries: &'a [VocabularyEntry],
    count: usize,
    difficulty_filter: Option<u8>,
    now: DateTime<Utc>,
) -> Vec<&'a VocabularyEntry> {
    if count == 0 {
        return Vec::new();
    }

    rank_practice_items(entries, difficulty_filter, now)
        .into_iter()
        .take(count)
        .map(|scored| scored.entry)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entry(id: &str, definition: &str) -> VocabularyEntry {
        let mut e = VocabularyEntry::new(id, id, now() - Duration::days(30));
        e.definition = definition.to_string();
        e.difficulty = 3;
        e.progress = 50.0;
        e.review_count = 10;
        e
    }

    fn ids(selected: &[&VocabularyEntry]) -> Vec<String> {
        selected.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn weight_components() {
        let mut e = entry("a", "x");
        // 100 + 25 + 20 + 15
        assert_eq!(practice_weight(&e, now()), 160.0);

        e.is_marked_difficult = true;
        assert_eq!(practice_weight(&e, now()), 190.0);

        e.review_count = 35;
        assert_eq!(practice_weight(&e, now()), 170.0);

        e.date_added = now() - Duration::days(2);
        assert_eq!(practice_weight(&e, now()), 220.0);

        e.date_added = now() - Duration::days(7);
        assert_eq!(practice_weight(&e, now()), 170.0);
    }

    #[test]
    fn future_date_counts_as_today() {
        let mut e = entry("a", "x");
        e.date_added = now() + Duration::days(3);
        let mut today = entry("b", "x");
        today.date_added = now();
        assert_eq!(practice_weight(&e, now()), practice_weight(&today, now()));
    }

    #[test]
    fn favorite_flag_is_not_weighted() {
        let mut e = entry("a", "x");
        let before = practice_weight(&e, now());
        e.is_favorite = true;
        assert_eq!(practice_weight(&e, now()), before);
    }

    #[test]
    fn new_difficult_word_beats_mastered_one() {
        let mut a = VocabularyEntry::new("a", "a", now());
        a.definition = "x".to_string();
        a.difficulty = 5;
        a.is_marked_difficult = true;

        let mut b = VocabularyEntry::new("b", "b", now() - Duration::days(180));
        b.definition = "y".to_string();
        b.progress = 100.0;
        b.review_count = 20;
        b.difficulty = 1;

        let entries = vec![b, a];
        let selected = select_practice_items(&entries, 1, None, now());
        assert_eq!(ids(&selected), vec!["a"]);
    }

    #[test]
    fn ineligible_entries_are_skipped() {
        let mut translated = entry("t", "");
        translated.translation = "cat".to_string();
        let entries = vec![entry("blank", "  "), translated, entry("d", "dog")];

        let selected = select_practice_items(&entries, 10, None, now());
        assert_eq!(ids(&selected), vec!["t", "d"]);
    }

    #[test]
    fn difficulty_filter_is_exact() {
        let mut hard = entry("hard", "x");
        hard.difficulty = 5;
        let entries = vec![entry("mid", "x"), hard];

        let selected = select_practice_items(&entries, 10, Some(5), now());
        assert_eq!(ids(&selected), vec!["hard"]);
        assert!(select_practice_items(&entries, 10, Some(1), now()).is_empty());
    }

    #[test]
    fn cardinality_is_min_of_count_and_eligible() {
        let entries: Vec<_> = (0..5).map(|i| entry(&i.to_string(), "x")).collect();
        assert_eq!(select_practice_items(&entries, 3, None, now()).len(), 3);
        assert_eq!(select_practice_items(&entries, 9, None, now()).len(), 5);
        assert!(select_practice_items(&entries, 0, None, now()).is_empty());
        assert!(select_practice_items(&[], 5, None, now()).is_empty());
    }

    #[test]
    fn ties_keep_input_order() {
        let entries: Vec<_> = ["c", "a", "b"].iter().map(|id| entry(id, "x")).collect();
        let selected = select_practice_items(&entries, 3, None, now());
        assert_eq!(ids(&selected), vec!["c", "a", "b"]);
    }

    #[test]
    fn ranking_is_descending_and_deterministic() {
        let entries: Vec<_> = (0..20u32)
            .map(|i| {
                let mut e = entry(&format!("w{i}"), "x");
                e.progress = f64::from((i * 37) % 101);
                e.review_count = (i * 7) % 25;
                e.difficulty = (i % 5) as u8 + 1;
                e.is_marked_difficult = i % 3 == 0;
                e.date_added = now() - Duration::days(i64::from(i % 10));
                e
            })
            .collect();

        let ranked = rank_practice_items(&entries, None, now());
        for pair in ranked.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }

        let first = select_practice_items(&entries, 8, None, now());
        let second = select_practice_items(&entries, 8, None, now());
        assert_eq!(ids(&first), ids(&second));
    }
}
