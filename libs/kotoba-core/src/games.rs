//! Practice mini-games.
//!
//! A [`GameSession`] is an immutable record. Answering or skipping returns a
//! new session and leaves the old one untouched, so a UI can keep history or
//! retry without cloning by hand.

use crate::error::GameError;
use crate::matching::{check_answer, AnswerCheck, DEFAULT_FUZZY_THRESHOLD};
use crate::reference::{self, KanaEntry, MAX_NUMBER};
use crate::types::{MatchingMode, Rating, VocabularyEntry};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Points for every correct answer.
pub const POINTS_PER_CORRECT: u32 = 10;
/// Points per consecutive correct answer after the first.
pub const STREAK_BONUS: u32 = 2;
/// Streak length after which the bonus stops growing.
pub const MAX_STREAK_STEPS: u32 = 5;

/// Which mini-game a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Kana,
    Numbers,
    Words,
}

impl GameKind {
    /// Matching mode used when the player types the answer.
    pub fn default_matching(self) -> MatchingMode {
        match self {
            Self::Kana | Self::Numbers => MatchingMode::CaseInsensitive,
            Self::Words => MatchingMode::Fuzzy,
        }
    }
}

/// A single prompt in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    /// Any of these is accepted.
    pub answers: Vec<String>,
    /// Multiple choice options; empty means the answer is typed.
    #[serde(default)]
    pub choices: Vec<String>,
    /// Library word this question was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_id: Option<String>,
}

/// How a question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Wrong,
    Skipped,
}

/// Feedback for one answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub expected: String,
    pub points: u32,
    pub streak: u32,
    pub check: AnswerCheck,
}

impl AnswerFeedback {
    pub fn rating(&self) -> Rating {
        Rating::from_correct(self.correct)
    }
}

/// End-of-game numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    pub skipped: usize,
    pub score: u32,
    pub best_streak: u32,
    /// Correct answers over answered (not skipped) questions, 0.0 when none.
    pub accuracy: f64,
}

/// State of a running game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSession {
    pub kind: GameKind,
    pub matching_mode: MatchingMode,
    pub fuzzy_threshold: f64,
    questions: Vec<Question>,
    outcomes: Vec<Outcome>,
    score: u32,
    streak: u32,
    best_streak: u32,
}

impl GameSession {
    pub fn new(kind: GameKind, questions: Vec<Question>) -> Self {
        Self {
            kind,
            matching_mode: kind.default_matching(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            questions,
            outcomes: Vec::new(),
            score: 0,
            streak: 0,
            best_streak: 0,
        }
    }

    pub fn with_matching(self, matching_mode: MatchingMode, fuzzy_threshold: f64) -> Self {
        Self {
            matching_mode,
            fuzzy_threshold,
            ..self
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn position(&self) -> usize {
        self.outcomes.len()
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.position())
    }

    pub fn is_finished(&self) -> bool {
        self.position() >= self.questions.len()
    }

    /// Answer the current question.
    pub fn answer(&self, typed: &str) -> Result<(Self, AnswerFeedback), GameError> {
        let question = self.current().ok_or(GameError::Finished)?;
        let accepted: Vec<&str> = question.answers.iter().map(String::as_str).collect();
        let check = check_answer(typed, &accepted, self.matching_mode, self.fuzzy_threshold);
        let expected = question.answers.first().cloned().unwrap_or_default();

        let mut next = self.clone();
        let points = if check.is_correct {
            next.streak += 1;
            next.best_streak = next.best_streak.max(next.streak);
            next.outcomes.push(Outcome::Correct);
            POINTS_PER_CORRECT + (next.streak - 1).min(MAX_STREAK_STEPS) * STREAK_BONUS
        } else {
            next.streak = 0;
            next.outcomes.push(Outcome::Wrong);
            0
        };
        next.score += points;

        let feedback = AnswerFeedback {
            correct: check.is_correct,
            expected,
            points,
            streak: next.streak,
            check,
        };
        Ok((next, feedback))
    }

    /// Skip the current question. Skipping does not break the streak.
    pub fn skip(&self) -> Result<Self, GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        let mut next = self.clone();
        next.outcomes.push(Outcome::Skipped);
        Ok(next)
    }

    /// Library words paired with how they were answered.
    pub fn word_results(&self) -> Vec<(&str, Outcome)> {
        self.questions
            .iter()
            .zip(&self.outcomes)
            .filter_map(|(q, outcome)| q.word_id.as_deref().map(|id| (id, *outcome)))
            .collect()
    }

    pub fn summary(&self) -> GameSummary {
        let count = |wanted: Outcome| self.outcomes.iter().filter(|o| **o == wanted).count();
        let correct = count(Outcome::Correct);
        let wrong = count(Outcome::Wrong);
        let answered = correct + wrong;

        GameSummary {
            total: self.questions.len(),
            correct,
            wrong,
            skipped: count(Outcome::Skipped),
            score: self.score,
            best_streak: self.best_streak,
            accuracy: if answered == 0 { 0.0 } else { correct as f64 / answered as f64 },
        }
    }
}

/// Kana → romaji questions. `choices` of 0 makes them typed.
pub fn kana_quiz<R: Rng + ?Sized>(
    kana: &[KanaEntry],
    count: usize,
    choices: usize,
    rng: &mut R,
) -> Result<Vec<Question>, GameError> {
    if count > kana.len() {
        return Err(GameError::NotEnoughMaterial { needed: count, available: kana.len() });
    }
    // あ and ア share a romaji, so choices are drawn from distinct romaji.
    let mut romaji: Vec<&str> = kana.iter().map(|k| k.romaji).collect();
    romaji.sort_unstable();
    romaji.dedup();
    if choices > romaji.len() {
        return Err(GameError::NotEnoughMaterial { needed: choices, available: romaji.len() });
    }

    let picked: Vec<&KanaEntry> = kana.choose_multiple(rng, count).collect();
    Ok(picked
        .into_iter()
        .map(|entry| {
            let options = if choices == 0 {
                Vec::new()
            } else {
                let others: Vec<&str> = romaji
                    .iter()
                    .copied()
                    .filter(|r| *r != entry.romaji)
                    .collect();
                let mut options: Vec<String> = others
                    .choose_multiple(rng, choices - 1)
                    .map(|r| r.to_string())
                    .collect();
                options.push(entry.romaji.to_string());
                options.shuffle(rng);
                options
            };
            Question {
                prompt: entry.kana.to_string(),
                answers: vec![entry.romaji.to_string()],
                choices: options,
                word_id: None,
            }
        })
        .collect())
}

/// Kanji numeral → digits or reading questions, values in `0..=max`.
pub fn number_quiz<R: Rng + ?Sized>(
    max: u64,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Question>, GameError> {
    let max = max.min(MAX_NUMBER);
    (0..count)
        .map(|_| {
            let value = rng.gen_range(0..=max);
            Ok(Question {
                prompt: reference::to_kanji(value)?,
                answers: vec![value.to_string(), reference::to_reading(value)?],
                choices: Vec::new(),
                word_id: None,
            })
        })
        .collect()
}

/// Word → meaning questions from eligible library entries.
pub fn word_quiz<R: Rng + ?Sized>(
    entries: &[VocabularyEntry],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Question>, GameError> {
    let eligible: Vec<&VocabularyEntry> = entries.iter().filter(|e| e.is_eligible()).collect();
    if count > eligible.len() {
        return Err(GameError::NotEnoughMaterial { needed: count, available: eligible.len() });
    }

    Ok(eligible
        .choose_multiple(rng, count)
        .map(|entry| Question {
            prompt: entry.text.clone(),
            answers: [&entry.definition, &entry.translation]
                .into_iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            choices: Vec::new(),
            word_id: Some(entry.id.clone()),
        })
        .collect())
}
