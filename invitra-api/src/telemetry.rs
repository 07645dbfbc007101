//! Tracing subscriber setup for the relay binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "invitra_api=debug,invitra_drafts=debug,tower_http=debug,info";

/// Install the global subscriber: `RUST_LOG` (or [`DEFAULT_LOG_FILTER`]) plus
/// JSON formatted output.
///
/// Call once at startup. A second call fails because a subscriber is already set.
pub fn init_tracing() -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!("Tracing initialized");
    Ok(())
}
