//! Minimal chat-completions client for quiz generation.
//!
//! We only call the OpenRouter-style `/chat/completions` endpoint with a
//! single user message and read back the first choice's text content.
//! Calls are instrumented and log model names, latencies, and usage counts
//! (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct LlmClient {
    pub client: reqwest::Client,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl LlmClient {
    /// Construct the client if we find OPENROUTER_API_KEY; otherwise return None.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY").ok()?;
        let base_url = std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".into());
        let model = std::env::var("OPENROUTER_MODEL")
            .unwrap_or_else(|_| "google/gemini-2.5-pro-preview".into());

        // Generating a full question set for a long document is slow.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .ok()?;

        Some(Self {
            client,
            api_key,
            base_url,
            model,
        })
    }

    /// Plain-text chat completion with a single user message.
    #[instrument(level = "info", skip(self, user), fields(model = %self.model, user_len = user.len()))]
    pub async fn chat_plain(
        &self,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, String> {
        let url = format!("{}/chat/completions", self.base_url);
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessageReq {
                role: "user".into(),
                content: user.into(),
            }],
            temperature,
            max_tokens: Some(max_tokens),
        };

        let start = std::time::Instant::now();
        let res = self
            .client
            .post(&url)
            .header(USER_AGENT, "manifesto-quiz-backend/0.1")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            // OpenRouter attribution headers.
            .header("HTTP-Referer", "https://github.com/manifest-quiz")
            .header("X-Title", "Manifest Quiz Generator")
            .json(&req)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            let msg = extract_api_error(&body).unwrap_or(body);
            return Err(format!("LLM HTTP {}: {}", status, msg));
        }

        let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
        if let Some(usage) = &body.usage {
            info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "LLM usage");
        }
        let text = body
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default()
            .trim()
            .to_string();
        info!(elapsed = ?start.elapsed(), reply_len = text.len(), "LLM reply received");

        Ok(text)
    }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessageReq>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResp,
}
#[derive(Deserialize)]
struct ChatMessageResp {
    content: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an API error body.
fn extract_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct EWrap {
        error: EObj,
    }
    #[derive(Deserialize)]
    struct EObj {
        message: String,
    }
    match serde_json::from_str::<EWrap>(body) {
        Ok(w) => Some(w.error.message),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_api_error_message_when_present() {
        let body = r#"{"error":{"message":"rate limited","code":429}}"#;
        assert_eq!(extract_api_error(body).as_deref(), Some("rate limited"));
        assert_eq!(extract_api_error("not json"), None);
    }
}
