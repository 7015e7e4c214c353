//! CSV merge pipeline: discover question-set files by glob, sort them for
//! deterministic ordering, and concatenate their valid data rows under a
//! single header.
//!
//! Policies (kept compatible with existing generated datasets):
//! - only the header of the first-processed file is written
//! - a data row is kept iff it has at least 8 fields; shorter rows are
//!   counted and dropped
//! - an unreadable input file is logged and skipped, the run continues
//! - zero matching inputs means no output file is written at all

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{error, info, warn};

/// Counters reported after a merge run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub files_found: usize,
    pub files_processed: usize,
    pub rows_written: usize,
    pub rows_skipped: usize,
}

/// Minimum number of columns a data row must carry to survive the merge.
pub const MIN_ROW_FIELDS: usize = 8;

pub fn merge_quiz_csvs(
    pattern: &str,
    output: &Path,
    exclude_existing: bool,
) -> anyhow::Result<MergeSummary> {
    let mut files: Vec<PathBuf> = glob::glob(pattern)
        .with_context(|| format!("bad glob pattern {:?}", pattern))?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(target: "merge", error = %e, "Unreadable glob entry");
                None
            }
        })
        .collect();

    // A previous combined file matching the pattern must not feed itself.
    if exclude_existing {
        files.retain(|p| p != output);
    }
    files.sort();

    let mut summary = MergeSummary {
        files_found: files.len(),
        ..MergeSummary::default()
    };

    if files.is_empty() {
        warn!(target: "merge", %pattern, "No CSV files found; nothing written");
        return Ok(summary);
    }

    for file in &files {
        info!(target: "merge", file = %file.display(), "Input file");
    }

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(output)
        .with_context(|| format!("creating {}", output.display()))?;

    let mut header_written = false;
    for file in &files {
        let mut reader = match csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(file)
        {
            Ok(r) => r,
            Err(e) => {
                error!(target: "merge", file = %file.display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };

        let mut file_ok = true;
        for (row_num, record) in reader.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    error!(target: "merge", file = %file.display(), error = %e, "Skipping file on read error");
                    file_ok = false;
                    break;
                }
            };
            if row_num == 0 {
                // Header row: write only the first one seen.
                if !header_written {
                    writer.write_record(&record)?;
                    header_written = true;
                    info!(target: "merge", header = %record.iter().collect::<Vec<_>>().join(","), "Header");
                }
            } else if record.len() >= MIN_ROW_FIELDS {
                writer.write_record(&record)?;
                summary.rows_written += 1;
            } else {
                summary.rows_skipped += 1;
            }
        }
        if file_ok {
            summary.files_processed += 1;
            info!(target: "merge", file = %file.display(), "Processed");
        }
    }
    writer.flush()?;

    info!(
        target: "merge",
        files = summary.files_processed,
        rows = summary.rows_written,
        skipped = summary.rows_skipped,
        output = %output.display(),
        "Merge complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "category,question,option1,option2,option3,option4,correct_answer,explanation";

    fn write_file(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).expect("write input");
    }

    #[test]
    fn merges_in_sorted_order_with_one_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "quiz_b.csv",
            &format!("{HEADER}\nB,q,a,b,c,d,1,e\n"),
        );
        write_file(
            dir.path(),
            "quiz_a.csv",
            &format!("{HEADER}\nA1,q,a,b,c,d,1,e\nA2,q,a,b,c,d,2,e\n"),
        );

        let pattern = dir.path().join("quiz_*.csv");
        let output = dir.path().join("quiz_all_combined.csv");
        let summary =
            merge_quiz_csvs(pattern.to_str().expect("utf8"), &output, true).expect("merge");

        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.rows_written, 3);

        let out = fs::read_to_string(&output).expect("read output");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("A1,"));
        assert!(lines[2].starts_with("A2,"));
        assert!(lines[3].starts_with("B,"));
    }

    #[test]
    fn drops_short_rows_and_counts_them() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "quiz_x.csv",
            &format!("{HEADER}\nX,q,a,b,c,d,1,e\ntoo,short,row\n"),
        );

        let pattern = dir.path().join("quiz_*.csv");
        let output = dir.path().join("combined.csv");
        let summary =
            merge_quiz_csvs(pattern.to_str().expect("utf8"), &output, true).expect("merge");

        assert_eq!(summary.rows_written, 1);
        assert_eq!(summary.rows_skipped, 1);
    }

    #[test]
    fn excludes_the_output_file_from_its_own_inputs() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "quiz_a.csv",
            &format!("{HEADER}\nA,q,a,b,c,d,1,e\n"),
        );

        // Output name matches the input pattern on purpose.
        let pattern = dir.path().join("quiz_*.csv");
        let output = dir.path().join("quiz_all.csv");

        let first =
            merge_quiz_csvs(pattern.to_str().expect("utf8"), &output, true).expect("merge 1");
        let bytes_first = fs::read(&output).expect("read 1");
        let second =
            merge_quiz_csvs(pattern.to_str().expect("utf8"), &output, true).expect("merge 2");
        let bytes_second = fs::read(&output).expect("read 2");

        assert_eq!(first, second);
        assert_eq!(bytes_first, bytes_second);
        assert_eq!(second.rows_written, 1);
    }

    #[test]
    fn no_inputs_means_no_output_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pattern = dir.path().join("quiz_*.csv");
        let output = dir.path().join("combined.csv");
        let summary =
            merge_quiz_csvs(pattern.to_str().expect("utf8"), &output, true).expect("merge");
        assert_eq!(summary.files_found, 0);
        assert!(!output.exists());
    }

    #[test]
    fn unreadable_file_is_skipped_and_run_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "quiz_ok.csv",
            &format!("{HEADER}\nOK,q,a,b,c,d,1,e\n"),
        );
        fs::create_dir(dir.path().join("quiz_dir.csv")).expect("mkdir");

        let pattern = dir.path().join("quiz_*.csv");
        let output = dir.path().join("combined.csv");
        let summary =
            merge_quiz_csvs(pattern.to_str().expect("utf8"), &output, true).expect("merge");

        assert_eq!(summary.files_found, 2);
        assert_eq!(summary.files_processed, 1);
        assert_eq!(summary.rows_written, 1);
    }
}
