//! Invitra relay - HTTP surface for debounced bulk-draft persistence
//!
//! Accepts draft saves from the invitation form builder, coalesces identical
//! resubmissions through [`invitra_drafts::DraftSaver`], and forwards the rest
//! to the invitation backend. Loads pass straight through.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{BackendConfig, DedupTimings, RelayConfig, CONFIG_ENV_VAR};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;
pub use telemetry::{init_tracing, DEFAULT_LOG_FILTER};

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the full relay router with request tracing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::drafts::create_router())
        .merge(routes::health::create_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
