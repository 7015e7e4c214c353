//! Loading the combined question CSV into the in-memory bank, with a
//! placeholder fallback so the UI degrades instead of crashing when the
//! combined file is missing or unreadable.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use tracing::warn;

use crate::domain::{QuizRecord, RawQuizRecord};

/// Read all valid question rows from the combined CSV. Rows that fail
/// validation (bad correct_answer, empty category, short row) are skipped
/// with a warning; only an unreadable file is an error.
pub fn load_question_bank(path: &Path) -> anyhow::Result<Vec<QuizRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let mut bank = Vec::new();
    for (i, row) in reader.deserialize::<RawQuizRecord>().enumerate() {
        let line = i + 2; // 1-based, after the header
        match row {
            Ok(raw) => match QuizRecord::try_from(raw) {
                Ok(record) => bank.push(record),
                Err(e) => warn!(target: "quiz", line, error = %e, "Skipping invalid question row"),
            },
            Err(e) => warn!(target: "quiz", line, error = %e, "Skipping unparsable question row"),
        }
    }
    Ok(bank)
}

/// Absolute last-resort question set: one fixed record telling the user the
/// bank could not be loaded. Keeps the quiz flow alive end to end.
pub fn placeholder_bank() -> Vec<QuizRecord> {
    vec![QuizRecord {
        category: "エラー".into(),
        question: "クイズデータの読み込みに失敗しました".into(),
        options: [
            "再読み込みしてください".into(),
            String::new(),
            String::new(),
            String::new(),
        ],
        correct_index: 0,
        explanation: "CSVファイルを確認してください".into(),
    }]
}

/// Load the bank, falling back to the placeholder when the file is
/// unreadable or contains no usable rows.
pub fn load_or_placeholder(path: &Path) -> Vec<QuizRecord> {
    match load_question_bank(path) {
        Ok(bank) if !bank.is_empty() => bank,
        Ok(_) => {
            tracing::error!(target: "quiz", path = %path.display(), "Question bank is empty; using placeholder");
            placeholder_bank()
        }
        Err(e) => {
            tracing::error!(target: "quiz", path = %path.display(), error = %e, "Failed to load question bank; using placeholder");
            placeholder_bank()
        }
    }
}
