//! Study service tests against an in-memory database.

mod common;

use common::{at, sample_words, service, word};
use kotoba_core::games::{word_quiz, GameKind, GameSession};
use kotoba_core::algorithm::sm2::MAXIMUM_INTERVAL;
use kotoba_core::query::WordQuery;
use kotoba_core::types::Rating;
use kotoba_core::ScheduleError;
use kotoba_store::db::{CardRepository, WordRepository};
use kotoba_store::{DbError, ServiceError};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn adding_a_word_creates_a_due_card() {
    let mut svc = service();
    let entry = svc.add_word(&word("猫", "cat", 1), at(1, 9)).unwrap();

    let due = svc.due_reviews(at(1, 9), 10).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].word, entry);
    assert_eq!(due[0].card.review_count, 0);
}

#[test]
fn reviews_follow_the_sm2_schedule() {
    let mut svc = service();
    let entry = svc.add_word(&word("犬", "dog", 2), at(1, 9)).unwrap();
    let card = svc.repository().card_for_word(&entry.id).unwrap().unwrap();

    let first = svc.review(&card.id, 4, at(1, 10)).unwrap();
    assert_eq!(first.interval, 1);
    assert_eq!(first.review_count, 1);
    assert_eq!(first.next_review, at(2, 10));

    let second = svc.review(&card.id, 5, at(2, 10)).unwrap();
    assert_eq!(second.interval, 6);
    assert!((second.ease_factor - 2.6).abs() < 1e-9);

    let third = svc.review(&card.id, 5, at(8, 10)).unwrap();
    // round(6 * 2.6)
    assert_eq!(third.interval, 16);

    let lapse = svc.review(&card.id, 0, at(24, 10)).unwrap();
    assert_eq!(lapse.interval, 1);
    assert!(lapse.ease_factor >= 1.3);
    assert_eq!(lapse.review_count, 4);

    let word = svc.repository().get_word(&entry.id).unwrap().unwrap();
    assert_eq!(word.review_count, 4);
    // +10, +15, +15, -10
    assert_eq!(word.progress, 30.0);

    let stats = svc.stats(at(24, 12)).unwrap();
    assert_eq!(stats.total_reviews, 4);
    assert!((stats.retention_rate - 0.75).abs() < 1e-9);
}

#[test]
fn many_easy_reviews_keep_the_due_queue_readable() {
    let mut svc = service();
    let steady = svc.add_word(&word("猫", "cat", 1), at(1, 9)).unwrap();
    let eager = svc.add_word(&word("犬", "dog", 1), at(1, 9)).unwrap();
    let card = svc.repository().card_for_word(&eager.id).unwrap().unwrap();

    let mut last = card;
    for _ in 0..30 {
        last = svc.review_rating(&last.id, Rating::Easy, at(1, 10)).unwrap();
        assert!(last.interval <= MAXIMUM_INTERVAL);
    }
    assert_eq!(last.interval, MAXIMUM_INTERVAL);
    assert_eq!(svc.repository().get_card(&last.id).unwrap(), Some(last));

    let due = svc.due_reviews(at(2, 10), 10).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].word.id, steady.id);
    assert_eq!(svc.stats(at(2, 10)).unwrap().due_cards, 1);
}

#[test]
fn rating_buttons_map_to_quality() {
    let mut svc = service();
    let entry = svc.add_word(&word("鳥", "bird", 1), at(1, 9)).unwrap();
    let card = svc.repository().card_for_word(&entry.id).unwrap().unwrap();

    let reviewed = svc.review_rating(&card.id, Rating::Again, at(1, 10)).unwrap();
    assert_eq!(reviewed.interval, 1);
    // quality 1 lowers ease by 0.54
    assert!((reviewed.ease_factor - 1.96).abs() < 1e-9);
}

#[test]
fn invalid_quality_is_rejected_and_nothing_is_saved() {
    let mut svc = service();
    let entry = svc.add_word(&word("鳥", "bird", 3), at(1, 9)).unwrap();
    let card = svc.repository().card_for_word(&entry.id).unwrap().unwrap();

    for quality in [-1, 6] {
        let err = svc.review(&card.id, quality, at(1, 10)).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Schedule(ScheduleError::InvalidQuality(q)) if q == quality
        ));
    }
    assert_eq!(svc.repository().get_card(&card.id).unwrap(), Some(card));
    assert_eq!(svc.stats(at(1, 11)).unwrap().total_reviews, 0);
}

#[test]
fn corrupted_card_is_surfaced() {
    let mut svc = service();
    let entry = svc.add_word(&word("魚", "fish", 1), at(1, 9)).unwrap();
    let mut card = svc.repository().card_for_word(&entry.id).unwrap().unwrap();
    card.ease_factor = 1.1;
    svc.repository().save_card(&card).unwrap();

    let err = svc.review(&card.id, 4, at(1, 10)).unwrap_err();
    assert!(matches!(err, ServiceError::Schedule(ScheduleError::InvalidCardState(_))));
}

#[test]
fn unknown_card_is_not_found() {
    let mut svc = service();
    let err = svc.review("missing", 4, at(1, 10)).unwrap_err();
    assert!(matches!(err, ServiceError::Db(DbError::CardNotFound(_))));
}

#[test]
fn practice_prefers_new_hard_and_marked_words() {
    let mut svc = service();
    let mut ids = Vec::new();
    for (i, w) in sample_words().iter().enumerate() {
        ids.push(svc.add_word(w, at(1 + i as u32, 9)).unwrap().id);
    }
    let mut blank = word("空", "", 1);
    blank.definition = "  ".to_string();
    svc.add_word(&blank, at(20, 9)).unwrap();

    svc.set_marked_difficult(&ids[0], true).unwrap();

    // three weeks later recency no longer matters
    let picked: Vec<String> = svc
        .start_practice(None, None, at(28, 9))
        .unwrap()
        .into_iter()
        .map(|w| w.text)
        .collect();
    // 猫 weighs 100+50+40+5+30, 馬 100+50+40+25, 魚 100+50+40+20
    assert_eq!(picked, vec!["猫", "馬", "魚"]);

    let hard_only = svc.start_practice(Some(10), Some(5), at(28, 9)).unwrap();
    assert_eq!(hard_only.len(), 1);
    assert_eq!(hard_only[0].text, "馬");

    assert!(svc.start_practice(Some(0), None, at(28, 9)).unwrap().is_empty());
}

#[test]
fn browse_is_cached_until_a_write() {
    let mut svc = service();
    for (i, w) in sample_words().iter().enumerate() {
        svc.add_word(w, at(1 + i as u32, 9)).unwrap();
    }

    let query = WordQuery::page(0, 2);
    let first = svc.browse(&query, at(10, 9)).unwrap();
    assert_eq!(first.total, 5);
    assert!(first.has_more);
    let texts: Vec<&str> = first.items.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["馬", "魚"]);

    // a write through the repository bypasses the cache
    let mut horse = first.items[0].clone();
    horse.definition = "large animal".to_string();
    svc.repository().update_word(&horse).unwrap();
    assert_eq!(svc.browse(&query, at(10, 9)).unwrap(), first);

    // a write through the service invalidates it
    svc.set_favorite(&horse.id, true).unwrap();
    let refreshed = svc.browse(&query, at(10, 9)).unwrap();
    assert!(refreshed.items[0].is_favorite);
    assert_eq!(refreshed.items[0].definition, "large animal");
}

#[test]
fn browse_cache_expires() {
    let mut svc = service();
    svc.add_word(&word("猫", "cat", 1), at(1, 9)).unwrap();
    let query = WordQuery::default();
    let page = svc.browse(&query, at(2, 9)).unwrap();

    let mut cat = page.items[0].clone();
    cat.translation = "kitty".to_string();
    svc.repository().update_word(&cat).unwrap();

    let later = at(2, 9) + chrono::Duration::seconds(61);
    assert_eq!(svc.browse(&query, later).unwrap().items[0].translation, "kitty");
}

#[test]
fn game_results_update_progress() {
    let mut svc = service();
    for (i, w) in sample_words().iter().enumerate() {
        svc.add_word(w, at(1 + i as u32, 9)).unwrap();
    }
    let words = svc.repository().all_words().unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let questions = word_quiz(&words, 3, &mut rng).unwrap();

    let game = GameSession::new(GameKind::Words, questions);
    let right = game.current().unwrap().answers[0].clone();
    let (game, _) = game.answer(&right).unwrap();
    let (game, _) = game.answer("zzzzzz").unwrap();
    let game = game.skip().unwrap();
    assert!(game.is_finished());

    assert_eq!(svc.record_game(&game).unwrap(), 2);

    let results = game.word_results();
    let correct = svc.repository().get_word(results[0].0).unwrap().unwrap();
    let wrong = svc.repository().get_word(results[1].0).unwrap().unwrap();
    let skipped = svc.repository().get_word(results[2].0).unwrap().unwrap();
    assert_eq!((correct.progress, correct.review_count), (5.0, 1));
    assert_eq!((wrong.progress, wrong.review_count), (0.0, 1));
    assert_eq!((skipped.progress, skipped.review_count), (0.0, 0));
}

#[test]
fn deleting_a_word_removes_it_everywhere() {
    let mut svc = service();
    let entry = svc.add_word(&word("牛", "cow", 2), at(1, 9)).unwrap();
    let card = svc.repository().card_for_word(&entry.id).unwrap().unwrap();
    svc.review(&card.id, 4, at(1, 10)).unwrap();

    svc.delete_word(&entry.id).unwrap();
    assert!(svc.due_reviews(at(30, 9), 10).unwrap().is_empty());
    assert_eq!(svc.browse(&WordQuery::default(), at(30, 9)).unwrap().total, 0);
    assert_eq!(svc.stats(at(30, 9)).unwrap().total_reviews, 0);
}

#[test]
fn calendar_counts_reviews_per_day() {
    let mut svc = service();
    let entry = svc.add_word(&word("猫", "cat", 1), at(1, 9)).unwrap();
    let card = svc.repository().card_for_word(&entry.id).unwrap().unwrap();
    svc.review(&card.id, 4, at(1, 10)).unwrap();
    svc.review(&card.id, 4, at(2, 10)).unwrap();
    svc.review(&card.id, 2, at(2, 11)).unwrap();

    let calendar = svc.calendar(3, at(2, 12)).unwrap();
    let counts: Vec<usize> = calendar.iter().map(|d| d.reviews).collect();
    assert_eq!(counts, vec![0, 1, 2]);
    assert_eq!(svc.stats(at(2, 12)).unwrap().streak_days, 2);
}
