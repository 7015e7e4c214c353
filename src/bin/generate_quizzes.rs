//! Generate quiz CSV files for every markdown document in a directory by
//! calling the configured chat-completions endpoint.
//!
//! Usage: generate_quizzes [DATA_DIR] [OUTPUT_DIR]
//!   DATA_DIR   defaults to "data"
//!   OUTPUT_DIR defaults to "."
//!
//! Requires OPENROUTER_API_KEY. Documents whose output file already exists
//! are skipped; failures for one document do not abort the batch.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use manifesto_quiz_backend::config::load_quiz_config_from_env;
use manifesto_quiz_backend::generator::generate_all;
use manifesto_quiz_backend::llm::LlmClient;
use manifesto_quiz_backend::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".into()));
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".into()));

    let client = LlmClient::from_env()
        .context("OPENROUTER_API_KEY is not set; quiz generation needs the LLM endpoint")?;
    let config = load_quiz_config_from_env().unwrap_or_default();

    info!(target: "generator", data_dir = %data_dir.display(), out_dir = %out_dir.display(), model = %client.model, "Generating quizzes");
    let summary = generate_all(&client, &config.prompts, &data_dir, &out_dir).await?;
    info!(
        target: "generator",
        documents_found = summary.documents_found,
        generated = summary.generated,
        skipped_existing = summary.skipped_existing,
        failed = summary.failed,
        "Done"
    );
    Ok(())
}
