//! HTTP endpoint handlers. These are thin wrappers that forward to core
//! logic; the session lives in the token-keyed store on `AppState` and the
//! client carries the token between calls.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

fn bad_request(message: String) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(ErrorOut { message })).into_response()
}

fn unknown_session(session_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorOut {
            message: format!("unknown sessionId: {}", session_id),
        }),
    )
        .into_response()
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_fields(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(FieldsOut {
        fields: list_fields(&state),
    })
}

#[instrument(level = "info", skip(state, body), fields(mode = %body.mode, count = body.count))]
pub async fn http_post_start(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartQuizIn>,
) -> impl IntoResponse {
    match start_session(&state, &body.mode, body.field, body.count) {
        Ok((session, question)) => {
            let total = question.total;
            let session_id = state.insert_session(session).await;
            info!(target: "quiz", %session_id, total, "HTTP quiz started");
            Json(StartQuizOut {
                session_id,
                question,
            })
            .into_response()
        }
        Err(message) => bad_request(message),
    }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, selected = body.selected))]
pub async fn http_post_reveal(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RevealIn>,
) -> impl IntoResponse {
    let result = state
        .with_session(&body.session_id, |session| {
            reveal_answer(session, body.selected)
        })
        .await;
    match result {
        Some(Ok(revealed)) => Json(revealed).into_response(),
        Some(Err(message)) => bad_request(message),
        None => unknown_session(&body.session_id),
    }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_advance(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdvanceIn>,
) -> impl IntoResponse {
    let result = state
        .with_session(&body.session_id, |session| {
            advance_session(session, &state)
        })
        .await;
    match result {
        Some(Ok((question, results))) => {
            if results.is_some() {
                info!(target: "quiz", session_id = %body.session_id, "HTTP quiz completed");
            }
            Json(AdvanceOut { question, results }).into_response()
        }
        Some(Err(message)) => bad_request(message),
        None => unknown_session(&body.session_id),
    }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_reset(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetIn>,
) -> impl IntoResponse {
    let existed = state.remove_session(&body.session_id).await;
    info!(target: "quiz", session_id = %body.session_id, existed, "HTTP quiz reset");
    Json(ResetOut { ok: existed })
}
