//! Concatenate all generated quiz CSV files into one combined file.
//!
//! Usage: combine_quizzes [PATTERN] [OUTPUT]
//!   PATTERN defaults to "quiz_*.csv"
//!   OUTPUT  defaults to "quiz_all_combined.csv"
//!
//! Set QUIZ_INCLUDE_EXISTING=1 to feed an existing combined file back into
//! the merge (excluded by default).

use std::path::PathBuf;

use tracing::info;

use manifesto_quiz_backend::merge::merge_quiz_csvs;
use manifesto_quiz_backend::telemetry;

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let mut args = std::env::args().skip(1);
    let pattern = args.next().unwrap_or_else(|| "quiz_*.csv".into());
    let output = PathBuf::from(args.next().unwrap_or_else(|| "quiz_all_combined.csv".into()));
    let exclude_existing = std::env::var("QUIZ_INCLUDE_EXISTING").as_deref() != Ok("1");

    let summary = merge_quiz_csvs(&pattern, &output, exclude_existing)?;
    info!(
        target: "merge",
        files_found = summary.files_found,
        files_processed = summary.files_processed,
        rows_written = summary.rows_written,
        rows_skipped = summary.rows_skipped,
        "Done"
    );
    Ok(())
}
