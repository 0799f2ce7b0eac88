//! REST API over a finished run.
//!
//! Provides two GET endpoints:
//! - `/state`: scenario config, episode summaries, and latest step record
//! - `/info`: step records with optional step-range and episode filtering

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::config::ScenarioConfig;
use crate::env::summary::EpisodeSummary;
use crate::env::types::StepInfo;

pub use types::{ErrorResponse, InfoQuery, StateResponse};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the run completes and wrapped in `Arc`; no locks
/// needed since all data is read-only.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Scenario the run was built from.
    pub config: ScenarioConfig,
    /// One summary per episode.
    pub summaries: Vec<EpisodeSummary>,
    /// Every step record of the run, in order.
    pub records: Vec<StepInfo>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/info", get(handlers::get_info))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
