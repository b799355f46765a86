//! Typed answer checking for quizzes and mini-games.

use crate::types::MatchingMode;
use serde::{Deserialize, Serialize};

/// Default similarity needed for a fuzzy match to count as correct.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Result of checking a typed answer against the accepted answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerCheck {
    pub is_correct: bool,
    /// Similarity score between 0.0 and 1.0 against the closest answer.
    pub similarity: f64,
    pub matching_mode: MatchingMode,
    /// Normalized typed answer (for display).
    pub typed_normalized: String,
    /// The accepted answer that scored best, if any were given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest: Option<String>,
}

/// Check a typed answer against every accepted answer and keep the best score.
pub fn check_answer(
    typed: &str,
    accepted: &[&str],
    mode: MatchingMode,
    fuzzy_threshold: f64,
) -> AnswerCheck {
    let typed_normalized = normalize_whitespace(typed);

    let best = accepted
        .iter()
        .map(|answer| normalize_whitespace(answer))
        .filter(|answer| !answer.is_empty())
        .map(|answer| {
            let similarity = score(&typed_normalized, &answer, mode);
            (answer, similarity)
        })
        .fold(None::<(String, f64)>, |best, candidate| match best {
            Some(current) if current.1 >= candidate.1 => Some(current),
            _ => Some(candidate),
        });

    let (closest, similarity) = match best {
        Some((answer, similarity)) => (Some(answer), similarity),
        None => (None, 0.0),
    };

    let is_correct = closest.is_some()
        && !typed_normalized.is_empty()
        && match mode {
            MatchingMode::Fuzzy => similarity >= fuzzy_threshold,
            MatchingMode::Exact | MatchingMode::CaseInsensitive => similarity >= 1.0,
        };

    AnswerCheck {
        is_correct,
        similarity,
        matching_mode: mode,
        typed_normalized,
        closest,
    }
}

fn score(typed: &str, answer: &str, mode: MatchingMode) -> f64 {
    match mode {
        MatchingMode::Exact => {
            if typed == answer { 1.0 } else { 0.0 }
        }
        MatchingMode::CaseInsensitive => {
            if typed.to_lowercase() == answer.to_lowercase() { 1.0 } else { 0.0 }
        }
        MatchingMode::Fuzzy => normalized_similarity(&typed.to_lowercase(), &answer.to_lowercase()),
    }
}

/// Normalize whitespace in a string (trim and collapse multiple spaces).
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Calculate Levenshtein distance between two strings, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Similarity between 0.0 and 1.0 based on Levenshtein distance.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    // chars, not bytes: kana are three bytes each in UTF-8
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}
