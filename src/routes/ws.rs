//! WebSocket upgrade + message loop. Each client message is parsed as JSON
//! and forwarded to core logic. We reply with a single JSON message per
//! request.
//!
//! The quiz session is a connection-local value: it lives exactly as long
//! as the socket and is never shared, so a closed tab simply drops the
//! in-progress attempt.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::QuizSession;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!(target: "quiz", "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!(target: "quiz", "WebSocket connected");
    let mut session: Option<QuizSession> = None;

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(txt) => {
                // Parse, dispatch, serialize response.
                let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
                    Ok(incoming) => {
                        debug!(target: "quiz", "WS received: {:?}", &incoming);
                        handle_client_ws(incoming, &state, &mut session)
                    }
                    Err(e) => ServerWsMessage::Error {
                        message: format!("Invalid JSON: {}", e),
                    },
                };

                let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
                    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
                });

                if let Err(e) = socket.send(Message::Text(out)).await {
                    error!(target: "quiz", error = %e, "WS send error");
                    break;
                }
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    info!(target: "quiz", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, session))]
fn handle_client_ws(
    msg: ClientWsMessage,
    state: &AppState,
    session: &mut Option<QuizSession>,
) -> ServerWsMessage {
    match msg {
        ClientWsMessage::Ping => ServerWsMessage::Pong,

        ClientWsMessage::ListFields => ServerWsMessage::Fields {
            fields: list_fields(state),
        },

        ClientWsMessage::StartQuiz { mode, field, count } => {
            match start_session(state, &mode, field, count) {
                Ok((started, question)) => {
                    info!(target: "quiz", total = question.total, "WS quiz started");
                    *session = Some(started);
                    ServerWsMessage::Question { question }
                }
                Err(message) => ServerWsMessage::Error { message },
            }
        }

        ClientWsMessage::Reveal { selected } => match session.as_mut() {
            Some(current) => match reveal_answer(current, selected) {
                Ok(revealed) => ServerWsMessage::Revealed { revealed },
                Err(message) => ServerWsMessage::Error { message },
            },
            None => ServerWsMessage::Error {
                message: "no quiz in progress".into(),
            },
        },

        ClientWsMessage::Advance => match session.as_mut() {
            Some(current) => match advance_session(current, state) {
                Ok((Some(question), _)) => ServerWsMessage::Question { question },
                Ok((None, Some(results))) => {
                    info!(target: "quiz", score = results.score, total = results.total, "WS quiz completed");
                    ServerWsMessage::Completed { results }
                }
                Ok((None, None)) => ServerWsMessage::Error {
                    message: "quiz produced neither question nor results".into(),
                },
                Err(message) => ServerWsMessage::Error { message },
            },
            None => ServerWsMessage::Error {
                message: "no quiz in progress".into(),
            },
        },

        ClientWsMessage::Reset => {
            *session = None;
            info!(target: "quiz", "WS quiz reset");
            ServerWsMessage::SessionReset
        }
    }
}
