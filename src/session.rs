//! The quiz session state machine.
//!
//! A session is an explicit value object: transitions mutate it in place and
//! the hosting layer (a WebSocket connection task, or the HTTP session map)
//! is responsible for keeping it alive between interaction events. There is
//! no ambient global store.
//!
//! Flow: `start` materializes the pool and the session, then each question
//! goes through `reveal` (record the selection, show the answer) followed by
//! `advance` (score the selection, move on or complete).

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::config::FieldGrouping;
use crate::domain::QuizRecord;

/// Hard cap on the number of questions offered in field mode.
pub const MAX_FIELD_QUESTIONS: usize = 20;

/// Question counts selectable in random mode.
pub const RANDOM_COUNT_OPTIONS: [usize; 4] = [5, 10, 15, 20];

/// Quiz configuration chosen by the user before the pool is materialized.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum QuizMode {
    Random { count: usize },
    ByField { field: String, count: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    EmptyPool,
    UnknownField(String),
    InvalidCount(usize),
    InvalidOption(usize),
    AlreadyRevealed,
    NotRevealed,
    SessionCompleted,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyPool => write!(f, "no questions match this configuration"),
            SessionError::UnknownField(name) => write!(f, "unknown field: {}", name),
            SessionError::InvalidCount(n) => write!(f, "invalid question count: {}", n),
            SessionError::InvalidOption(n) => write!(f, "invalid option index: {}", n),
            SessionError::AlreadyRevealed => write!(f, "answer already revealed"),
            SessionError::NotRevealed => write!(f, "answer not yet revealed"),
            SessionError::SessionCompleted => write!(f, "quiz already completed"),
        }
    }
}

impl std::error::Error for SessionError {}

/// What `advance` moved the session to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Next question is up, identified by its 0-based pool index.
    Next(usize),
    Completed,
}

#[derive(Clone, Debug)]
pub struct QuizSession {
    pool: Vec<QuizRecord>,
    current: usize,
    score: u32,
    answers: Vec<usize>,
    /// Selection recorded at reveal time; Some(_) == reveal state.
    pending: Option<usize>,
    completed: bool,
}

impl QuizSession {
    /// Materialize the question pool for the chosen mode and start at
    /// question 0. Configurations yielding zero questions are rejected here
    /// so that later transitions never index an empty pool.
    pub fn start(
        bank: &[QuizRecord],
        mode: &QuizMode,
        fields: &[FieldGrouping],
        rng: &mut impl Rng,
    ) -> Result<QuizSession, SessionError> {
        let pool = match mode {
            QuizMode::Random { count } => {
                if !RANDOM_COUNT_OPTIONS.contains(count) {
                    return Err(SessionError::InvalidCount(*count));
                }
                sample_pool(bank.iter(), *count, rng)?
            }
            QuizMode::ByField { field, count } => {
                let grouping = fields
                    .iter()
                    .find(|g| &g.name == field)
                    .ok_or_else(|| SessionError::UnknownField(field.clone()))?;
                if *count == 0 {
                    return Err(SessionError::InvalidCount(*count));
                }
                let matching = bank
                    .iter()
                    .filter(|r| grouping.categories.contains(&r.category));
                // Requested count is bounded by the grouping's pool and the
                // hard cap; a larger request just gets the maximum.
                sample_pool(matching, (*count).min(MAX_FIELD_QUESTIONS), rng)?
            }
        };
        Ok(QuizSession {
            pool,
            current: 0,
            score: 0,
            answers: Vec::new(),
            pending: None,
            completed: false,
        })
    }

    /// Record the user's selection and flip into the reveal state. No
    /// scoring happens yet; the UI shows correctness and the explanation
    /// before the user advances.
    pub fn reveal(&mut self, selected: usize) -> Result<&QuizRecord, SessionError> {
        if self.completed {
            return Err(SessionError::SessionCompleted);
        }
        if self.pending.is_some() {
            return Err(SessionError::AlreadyRevealed);
        }
        if selected > 3 {
            return Err(SessionError::InvalidOption(selected));
        }
        self.pending = Some(selected);
        Ok(&self.pool[self.current])
    }

    /// Score the revealed selection and move to the next question, or
    /// complete the session after the last one.
    pub fn advance(&mut self) -> Result<Progress, SessionError> {
        if self.completed {
            return Err(SessionError::SessionCompleted);
        }
        let selected = self.pending.take().ok_or(SessionError::NotRevealed)?;
        if selected == self.pool[self.current].correct_index {
            self.score += 1;
        }
        self.answers.push(selected);
        self.current += 1;
        if self.current == self.pool.len() {
            self.completed = true;
            Ok(Progress::Completed)
        } else {
            Ok(Progress::Next(self.current))
        }
    }

    /// The question currently presented, None once completed.
    pub fn current_question(&self) -> Option<&QuizRecord> {
        if self.completed {
            None
        } else {
            self.pool.get(self.current)
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.pool.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn pool(&self) -> &[QuizRecord] {
        &self.pool
    }

    /// Selected option index per answered question, in pool order.
    pub fn answers(&self) -> &[usize] {
        &self.answers
    }

    pub fn is_revealed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Shuffle the matching records and keep at most `count`. The whole
/// (shuffled) set is kept when it is not larger than the request.
fn sample_pool<'a>(
    records: impl Iterator<Item = &'a QuizRecord>,
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<QuizRecord>, SessionError> {
    let mut pool: Vec<QuizRecord> = records.cloned().collect();
    if pool.is_empty() {
        return Err(SessionError::EmptyPool);
    }
    pool.shuffle(rng);
    pool.truncate(count);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(category: &str, question: &str, correct: usize) -> QuizRecord {
        QuizRecord {
            category: category.into(),
            question: question.into(),
            options: ["w".into(), "x".into(), "y".into(), "z".into()],
            correct_index: correct,
            explanation: "explanation".into(),
        }
    }

    fn bank(n: usize) -> Vec<QuizRecord> {
        (0..n)
            .map(|i| record("教育政策", &format!("Q{}", i), i % 4))
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn random_mode_samples_without_replacement() {
        let bank = bank(30);
        let session =
            QuizSession::start(&bank, &QuizMode::Random { count: 10 }, &[], &mut rng()).expect("start");
        assert_eq!(session.total(), 10);
        let mut questions: Vec<&str> = session.pool().iter().map(|r| r.question.as_str()).collect();
        questions.sort_unstable();
        questions.dedup();
        assert_eq!(questions.len(), 10);
    }

    #[test]
    fn random_mode_keeps_whole_bank_when_small() {
        let bank = bank(3);
        let session =
            QuizSession::start(&bank, &QuizMode::Random { count: 5 }, &[], &mut rng()).expect("start");
        assert_eq!(session.total(), 3);
    }

    #[test]
    fn random_mode_rejects_counts_outside_the_fixed_set() {
        let bank = bank(30);
        assert_eq!(
            QuizSession::start(&bank, &QuizMode::Random { count: 7 }, &[], &mut rng()).unwrap_err(),
            SessionError::InvalidCount(7)
        );
    }

    #[test]
    fn by_field_filters_to_grouping_categories() {
        let mut bank = bank(4);
        bank.push(record("医療政策", "M0", 0));
        bank.push(record("医療政策", "M1", 1));
        let fields = vec![FieldGrouping {
            name: "医療".into(),
            categories: vec!["医療政策".into()],
        }];
        let mode = QuizMode::ByField {
            field: "医療".into(),
            count: 10,
        };
        let session = QuizSession::start(&bank, &mode, &fields, &mut rng()).expect("start");
        assert_eq!(session.total(), 2);
        assert!(session.pool().iter().all(|r| r.category == "医療政策"));
    }

    #[test]
    fn by_field_caps_at_twenty_questions() {
        let bank = bank(40);
        let fields = vec![FieldGrouping {
            name: "教育".into(),
            categories: vec!["教育政策".into()],
        }];
        let mode = QuizMode::ByField {
            field: "教育".into(),
            count: 40,
        };
        let session = QuizSession::start(&bank, &mode, &fields, &mut rng()).expect("start");
        assert_eq!(session.total(), MAX_FIELD_QUESTIONS);
    }

    #[test]
    fn unknown_field_and_empty_pool_are_rejected() {
        let bank = bank(4);
        let fields = vec![FieldGrouping {
            name: "医療".into(),
            categories: vec!["医療政策".into()],
        }];
        assert_eq!(
            QuizSession::start(
                &bank,
                &QuizMode::ByField { field: "経済".into(), count: 5 },
                &fields,
                &mut rng()
            )
            .unwrap_err(),
            SessionError::UnknownField("経済".into())
        );
        // The grouping exists but no bank record matches its categories.
        assert_eq!(
            QuizSession::start(
                &bank,
                &QuizMode::ByField { field: "医療".into(), count: 5 },
                &fields,
                &mut rng()
            )
            .unwrap_err(),
            SessionError::EmptyPool
        );
    }

    #[test]
    fn m_advances_complete_a_pool_of_m() {
        let bank = bank(5);
        let mut session =
            QuizSession::start(&bank, &QuizMode::Random { count: 5 }, &[], &mut rng()).expect("start");
        let total = session.total();
        for i in 0..total {
            assert!(!session.is_completed());
            session.reveal(0).expect("reveal");
            let progress = session.advance().expect("advance");
            if i + 1 == total {
                assert_eq!(progress, Progress::Completed);
            } else {
                assert_eq!(progress, Progress::Next(i + 1));
            }
        }
        assert!(session.is_completed());
        assert_eq!(session.answers().len(), total);
        assert_eq!(session.current_index(), total);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn score_counts_index_matches_only() {
        let bank = vec![record("A", "Q0", 1), record("A", "Q1", 2)];
        let mut session =
            QuizSession::start(&bank, &QuizMode::Random { count: 5 }, &[], &mut rng()).expect("start");
        let correct: Vec<usize> = session.pool().iter().map(|r| r.correct_index).collect();

        session.reveal(correct[0]).expect("reveal");
        session.advance().expect("advance");
        session.reveal((correct[1] + 1) % 4).expect("reveal");
        session.advance().expect("advance");

        assert_eq!(session.score(), 1);
        let recount = session
            .answers()
            .iter()
            .zip(session.pool())
            .filter(|(a, r)| **a == r.correct_index)
            .count() as u32;
        assert_eq!(session.score(), recount);
    }

    #[test]
    fn reveal_and_advance_enforce_ordering() {
        let bank = bank(5);
        let mut session =
            QuizSession::start(&bank, &QuizMode::Random { count: 5 }, &[], &mut rng()).expect("start");
        assert_eq!(session.advance().unwrap_err(), SessionError::NotRevealed);
        session.reveal(2).expect("reveal");
        assert_eq!(session.reveal(2).unwrap_err(), SessionError::AlreadyRevealed);
        assert_eq!(session.reveal(9).unwrap_err(), SessionError::AlreadyRevealed);
        session.advance().expect("advance");
        assert_eq!(session.reveal(9).unwrap_err(), SessionError::InvalidOption(9));
    }

    #[test]
    fn completed_session_rejects_further_transitions() {
        let bank = bank(1);
        let mut session =
            QuizSession::start(&bank, &QuizMode::Random { count: 5 }, &[], &mut rng()).expect("start");
        session.reveal(0).expect("reveal");
        assert_eq!(session.advance().expect("advance"), Progress::Completed);
        assert_eq!(session.reveal(0).unwrap_err(), SessionError::SessionCompleted);
        assert_eq!(session.advance().unwrap_err(), SessionError::SessionCompleted);
    }

    #[test]
    fn empty_bank_is_rejected_at_start() {
        assert_eq!(
            QuizSession::start(&[], &QuizMode::Random { count: 5 }, &[], &mut rng()).unwrap_err(),
            SessionError::EmptyPool
        );
    }
}
