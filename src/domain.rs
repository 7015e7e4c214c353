//! Domain models: the persisted quiz record and its raw CSV mirror.

use serde::{Deserialize, Serialize};

/// Canonical header of every generated and combined quiz CSV file.
pub const CSV_HEADER: [&str; 8] = [
    "category",
    "question",
    "option1",
    "option2",
    "option3",
    "option4",
    "correct_answer",
    "explanation",
];

/// One CSV row exactly as written on disk. `correct_answer` is a 1-based
/// digit string ("1".."4"); conversion to the 0-based index happens in
/// `QuizRecord::try_from`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawQuizRecord {
    pub category: String,
    pub question: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub correct_answer: String,
    pub explanation: String,
}

/// Validated in-memory question: four options and a 0-based correct index.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct QuizRecord {
    pub category: String,
    pub question: String,
    pub options: [String; 4],
    pub correct_index: usize,
    pub explanation: String,
}

impl QuizRecord {
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

impl TryFrom<RawQuizRecord> for QuizRecord {
    type Error = String;

    fn try_from(raw: RawQuizRecord) -> Result<Self, Self::Error> {
        let category = raw.category.trim().to_string();
        if category.is_empty() {
            return Err("empty category".into());
        }
        let n: usize = raw
            .correct_answer
            .trim()
            .parse()
            .map_err(|_| format!("correct_answer is not a number: {:?}", raw.correct_answer))?;
        if !(1..=4).contains(&n) {
            return Err(format!("correct_answer out of range 1..=4: {}", n));
        }
        Ok(QuizRecord {
            category,
            question: raw.question,
            options: [raw.option1, raw.option2, raw.option3, raw.option4],
            correct_index: n - 1,
            explanation: raw.explanation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(correct: &str) -> RawQuizRecord {
        RawQuizRecord {
            category: "教育政策".into(),
            question: "Q?".into(),
            option1: "a".into(),
            option2: "b".into(),
            option3: "c".into(),
            option4: "d".into(),
            correct_answer: correct.into(),
            explanation: "because".into(),
        }
    }

    #[test]
    fn converts_one_based_answer_to_zero_based_index() {
        let r = QuizRecord::try_from(raw("3")).expect("valid record");
        assert_eq!(r.correct_index, 2);
        assert_eq!(r.correct_option(), "c");
    }

    #[test]
    fn rejects_out_of_range_answers() {
        assert!(QuizRecord::try_from(raw("0")).is_err());
        assert!(QuizRecord::try_from(raw("5")).is_err());
        assert!(QuizRecord::try_from(raw("two")).is_err());
    }

    #[test]
    fn rejects_empty_category() {
        let mut r = raw("1");
        r.category = "  ".into();
        assert!(QuizRecord::try_from(r).is_err());
    }

    #[test]
    fn trims_whitespace_around_answer_digit() {
        let r = QuizRecord::try_from(raw(" 4 ")).expect("valid record");
        assert_eq!(r.correct_index, 3);
    }
}
