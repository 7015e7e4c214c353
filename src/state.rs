//! Application state: the loaded question bank, quiz configuration, and the
//! token-keyed store of HTTP-driven sessions.
//!
//! The bank and configuration are immutable after startup. Sessions created
//! over HTTP are kept here keyed by a client-held uuid token; WebSocket
//! connections own their session as a connection-local value instead.

use std::collections::HashMap;
use std::path::Path;

use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::bank::load_or_placeholder;
use crate::config::{load_quiz_config_from_env, QuizConfig};
use crate::domain::QuizRecord;
use crate::session::QuizSession;

pub struct AppState {
    pub bank: Vec<QuizRecord>,
    pub config: QuizConfig,
    sessions: RwLock<HashMap<String, QuizSession>>,
}

impl AppState {
    /// Build state from env: load config (defaults when absent), load the
    /// combined question CSV (placeholder fallback), log the inventory.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_quiz_config_from_env().unwrap_or_default();
        let bank = load_or_placeholder(Path::new(&config.questions_path));

        // Inventory summary by category.
        let mut count_by_category: HashMap<&str, usize> = HashMap::new();
        for record in &bank {
            *count_by_category.entry(record.category.as_str()).or_default() += 1;
        }
        for (category, count) in count_by_category {
            info!(target: "quiz", %category, questions = count, "Startup question inventory");
        }
        info!(target: "quiz", total = bank.len(), fields = config.fields.len(), "Question bank ready");

        Self {
            bank,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Used by tests and embedding code that already has a bank in hand.
    pub fn with_bank(bank: Vec<QuizRecord>, config: QuizConfig) -> Self {
        Self {
            bank,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Store a freshly started session and hand back its client token.
    pub async fn insert_session(&self, session: QuizSession) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    /// Run a closure against the stored session for `token`, if any.
    pub async fn with_session<T>(
        &self,
        token: &str,
        f: impl FnOnce(&mut QuizSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(token).map(f)
    }

    /// Reset: drop the stored session. Returns whether it existed.
    pub async fn remove_session(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}
