//! Quiz question generation: prompt construction, free-text response
//! parsing, and the sequential batch driver over a directory of markdown
//! documents.
//!
//! Parsing policies are kept compatible with existing generated datasets:
//! a candidate line needs at least one comma, commas inside double quotes
//! are literal, rows with fewer than 8 fields are dropped, and rows with
//! more than 8 fields are truncated to the first 8 (extra fields are never
//! merged into the explanation).

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{error, info, warn};

use crate::config::Prompts;
use crate::domain::{RawQuizRecord, CSV_HEADER};
use crate::llm::LlmClient;
use crate::util::{fill_template, trunc_for_log};

/// Sampling temperature and token bound used for every generation call.
const GENERATION_TEMPERATURE: f32 = 0.3;
const GENERATION_MAX_TOKENS: u32 = 4000;

/// Counters reported after a batch generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub documents_found: usize,
    pub generated: usize,
    pub skipped_existing: usize,
    pub failed: usize,
}

/// Derive the category label from a document's base name by stripping a
/// leading run of digits followed by an underscore ("03_教育政策" -> "教育政策").
pub fn category_from_filename(stem: &str) -> String {
    let digits = stem.chars().take_while(|c| c.is_ascii_digit()).count();
    match stem[digits..].strip_prefix('_') {
        Some(rest) if digits > 0 => rest.to_string(),
        _ => stem.to_string(),
    }
}

pub fn build_generation_prompt(prompts: &Prompts, content: &str, category: &str) -> String {
    fill_template(
        &prompts.generation_template,
        &[("content", content), ("category", category)],
    )
}

/// Split one response line on commas with quote awareness: a double quote
/// toggles the in-quotes state and is dropped from the field value; commas
/// inside quotes are literal. Fields are trimmed.
fn split_quoted_commas(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Parse the model's free-text reply into raw CSV rows, line by line.
pub fn parse_generated_rows(response: &str) -> Vec<RawQuizRecord> {
    let mut rows = Vec::new();
    for line in response.lines() {
        if line.trim().is_empty() || !line.contains(',') {
            continue;
        }
        let parts = split_quoted_commas(line);
        if parts.len() < 8 {
            warn!(target: "generator", fields = parts.len(), line = %trunc_for_log(line, 60), "Dropping short row");
            continue;
        }
        // Truncate, never merge extras into the explanation.
        rows.push(RawQuizRecord {
            category: parts[0].clone(),
            question: parts[1].clone(),
            option1: parts[2].clone(),
            option2: parts[3].clone(),
            option3: parts[4].clone(),
            option4: parts[5].clone(),
            correct_answer: parts[6].clone(),
            explanation: parts[7].clone(),
        });
    }
    rows
}

fn write_quiz_csv(path: &Path, rows: &[RawQuizRecord]) -> anyhow::Result<()> {
    // The header is written explicitly; keep serde from emitting its own.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Generate quiz rows for a single markdown document and write them to
/// `out_csv`. Returns the number of rows written.
pub async fn generate_for_file(
    client: &LlmClient,
    prompts: &Prompts,
    md_path: &Path,
    out_csv: &Path,
) -> anyhow::Result<usize> {
    let content = std::fs::read_to_string(md_path)
        .with_context(|| format!("reading {}", md_path.display()))?;
    let stem = md_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let category = category_from_filename(stem);

    let prompt = build_generation_prompt(prompts, &content, &category);
    let response = client
        .chat_plain(&prompt, GENERATION_TEMPERATURE, GENERATION_MAX_TOKENS)
        .await
        .map_err(anyhow::Error::msg)?;

    let rows = parse_generated_rows(&response);
    if rows.is_empty() {
        anyhow::bail!("model reply contained no parsable quiz rows");
    }
    write_quiz_csv(out_csv, &rows)?;
    info!(target: "generator", %category, rows = rows.len(), output = %out_csv.display(), "Generated quiz file");
    Ok(rows.len())
}

/// Batch-generate quizzes for every `*.md` in `data_dir`, strictly
/// sequentially. A document whose output file already exists is skipped
/// (existence only, no freshness check); a failure for one document is
/// logged and does not abort the batch.
pub async fn generate_all(
    client: &LlmClient,
    prompts: &Prompts,
    data_dir: &Path,
    out_dir: &Path,
) -> anyhow::Result<BatchSummary> {
    let pattern = data_dir.join("*.md");
    let mut md_files: Vec<PathBuf> = glob::glob(pattern.to_str().context("non-utf8 data dir")?)?
        .filter_map(Result::ok)
        .filter(|p| {
            !matches!(
                p.file_name().and_then(|n| n.to_str()),
                Some("README.md") | Some("LICENSE")
            )
        })
        .collect();
    md_files.sort();

    let mut summary = BatchSummary {
        documents_found: md_files.len(),
        ..BatchSummary::default()
    };
    info!(target: "generator", documents = summary.documents_found, dir = %data_dir.display(), "Starting batch generation");

    for md_file in &md_files {
        let stem = md_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let out_csv = out_dir.join(format!("quiz_{}.csv", stem));
        if out_csv.exists() {
            info!(target: "generator", output = %out_csv.display(), "Quiz file already exists; skipping");
            summary.skipped_existing += 1;
            continue;
        }
        match generate_for_file(client, prompts, md_file, &out_csv).await {
            Ok(_) => summary.generated += 1,
            Err(e) => {
                error!(target: "generator", file = %md_file.display(), error = %e, "Generation failed; continuing batch");
                summary.failed += 1;
            }
        }
    }

    info!(
        target: "generator",
        generated = summary.generated,
        skipped = summary.skipped_existing,
        failed = summary.failed,
        "Batch generation complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_numeric_prefix_from_filename() {
        assert_eq!(category_from_filename("03_教育政策"), "教育政策");
        assert_eq!(category_from_filename("12_vision"), "vision");
        // No digit prefix or no underscore: keep as-is.
        assert_eq!(category_from_filename("教育政策"), "教育政策");
        assert_eq!(category_from_filename("03教育"), "03教育");
    }

    #[test]
    fn quoted_comma_stays_inside_field() {
        let rows = parse_generated_rows(r#"a,"b,c",d,e,f,g,1,h"#);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].question, "b,c");
        assert_eq!(rows[0].correct_answer, "1");
        assert_eq!(rows[0].explanation, "h");
    }

    #[test]
    fn short_rows_are_dropped() {
        let rows = parse_generated_rows("a,b,c\n\nno commas here either way");
        assert!(rows.is_empty());
    }

    #[test]
    fn long_rows_are_truncated_to_eight_fields() {
        let rows = parse_generated_rows("cat,q,1,2,3,4,2,expl,extra,more");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].explanation, "expl");
    }

    #[test]
    fn parses_multiple_lines_and_ignores_prose() {
        let reply = "以下がクイズです:\n\
                     教育政策,Q1?,a,b,c,d,1,E1\n\
                     教育政策,Q2?,a,b,c,d,4,E2\n";
        let rows = parse_generated_rows(reply);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].correct_answer, "4");
    }

    #[test]
    fn prompt_carries_content_and_category() {
        let prompts = Prompts::default();
        let p = build_generation_prompt(&prompts, "本文テキスト", "教育政策");
        assert!(p.contains("本文テキスト"));
        assert!(p.contains("「教育政策」"));
        assert!(!p.contains("{content}"));
    }
}
