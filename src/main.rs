//! Gestor de Tasks · Backend
//!
//! - Axum HTTP + WebSocket API
//! - Forwards submissions and status lookups to the external task API
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 4000)
//!   API_URL       : base URL of the upstream task API (default "http://localhost:3000")
//!   API_KEY       : bearer token for upstream calls; header omitted when empty
//!   GESTOR_CONFIG_PATH : path to TOML config (upstream fallbacks + form defaults)
//!   LOG_LEVEL     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT    : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod source;
mod draft;
mod upstream;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (upstream client + form defaults).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 4000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 4000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "gestor_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
