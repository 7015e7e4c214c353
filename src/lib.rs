//! Manifesto Quiz · Backend
//!
//! - Axum HTTP + WebSocket API driving four-option multiple-choice quizzes
//! - CSV question bank (generated from manifesto markdown via an LLM endpoint)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   OPENROUTER_API_KEY : enables quiz generation if present
//!   OPENROUTER_BASE_URL: default "https://openrouter.ai/api/v1"
//!   OPENROUTER_MODEL   : default "google/gemini-2.5-pro-preview"
//!   QUIZ_CONFIG_PATH   : path to TOML config (prompts, field groupings, recommendations)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

pub mod bank;
pub mod config;
pub mod domain;
pub mod generator;
pub mod llm;
pub mod logic;
pub mod merge;
pub mod protocol;
pub mod routes;
pub mod scoring;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod util;
