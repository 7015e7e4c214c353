//! Manifesto Quiz · server entry point.
//!
//! Loads the combined question CSV, builds shared state, and serves the
//! HTTP/WebSocket API plus the static front end. See lib.rs for the env
//! variables that configure the process.

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::{info, instrument};

use manifesto_quiz_backend::routes::build_router;
use manifesto_quiz_backend::state::AppState;
use manifesto_quiz_backend::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    // Build shared application state (question bank, config, session store).
    let state = Arc::new(AppState::new());

    // Build the HTTP router with routes, CORS and tracing layers.
    let app = build_router(state.clone());

    // Read port from env or default to 3000.
    let addr: SocketAddr = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

    let listener = TcpListener::bind(addr).await?;
    info!(target: "quiz", %addr, "HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
