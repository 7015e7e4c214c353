//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! The correct answer and explanation are deliberately absent from
//! `QuestionOut`; they only travel in `RevealedOut` after the user commits
//! a selection.

use serde::{Deserialize, Serialize};

use crate::scoring::CategoryScore;
use crate::session::QuizSession;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListFields,
    StartQuiz {
        /// "random" or "by_field".
        mode: String,
        #[serde(default)]
        field: Option<String>,
        count: usize,
    },
    Reveal {
        selected: usize,
    },
    Advance,
    Reset,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Fields {
        fields: Vec<FieldInfo>,
    },
    Question {
        question: QuestionOut,
    },
    Revealed {
        #[serde(flatten)]
        revealed: RevealedOut,
    },
    Completed {
        results: ResultsOut,
    },
    SessionReset,
    Error {
        message: String,
    },
}

/// One selectable topic area with its available question inventory.
#[derive(Clone, Debug, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub available: usize,
    #[serde(rename = "maxCount")]
    pub max_count: usize,
}

/// The current question as presented to the user.
#[derive(Clone, Debug, Serialize)]
pub struct QuestionOut {
    pub index: usize,
    pub total: usize,
    pub category: String,
    pub question: String,
    pub options: [String; 4],
}

/// Shown after the user commits a selection, before advancing.
#[derive(Clone, Debug, Serialize)]
pub struct RevealedOut {
    pub correct: bool,
    #[serde(rename = "correctIndex")]
    pub correct_index: usize,
    #[serde(rename = "correctOption")]
    pub correct_option: String,
    pub explanation: String,
}

/// Per-question detail for the completed-quiz review expander.
#[derive(Clone, Debug, Serialize)]
pub struct ReviewItem {
    pub question: String,
    pub category: String,
    #[serde(rename = "selectedOption")]
    pub selected_option: String,
    #[serde(rename = "correctOption")]
    pub correct_option: String,
    pub correct: bool,
    pub explanation: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResultsOut {
    pub score: u32,
    pub total: usize,
    pub percentage: f32,
    pub breakdown: Vec<CategoryScore>,
    pub recommendations: Vec<String>,
    pub review: Vec<ReviewItem>,
}

/// The current question of a session as a DTO, None once completed.
pub fn question_out(session: &QuizSession) -> Option<QuestionOut> {
    session.current_question().map(|record| QuestionOut {
        index: session.current_index(),
        total: session.total(),
        category: record.category.clone(),
        question: record.question.clone(),
        options: record.options.clone(),
    })
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct StartQuizIn {
    /// "random" or "by_field".
    pub mode: String,
    #[serde(default)]
    pub field: Option<String>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct StartQuizOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub question: QuestionOut,
}

#[derive(Debug, Deserialize)]
pub struct RevealIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub selected: usize,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Either the next question or, after the last advance, the results.
#[derive(Serialize)]
pub struct AdvanceOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsOut>,
}

#[derive(Debug, Deserialize)]
pub struct ResetIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Serialize)]
pub struct ResetOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct FieldsOut {
    pub fields: Vec<FieldInfo>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
