//! Health Check Endpoint
//!
//! `GET /health` reports liveness plus the dedup cache counters.
//! No authentication required.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Live entries in the dedup cache.
    pub cached_drafts: usize,
    /// Saves answered from the cache since startup.
    pub suppressed_saves: u64,
    /// Saves the backend accepted since startup.
    pub recorded_saves: u64,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.saver.stats();
    Json(HealthResponse {
        status: "ok".to_string(),
        cached_drafts: stats.entries,
        suppressed_saves: stats.saves_suppressed,
        recorded_saves: stats.saves_recorded,
    })
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
