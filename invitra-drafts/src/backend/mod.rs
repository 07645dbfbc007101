//! Remote invitation backend.
//!
//! The backend owns every durable draft. This module defines the
//! [`DraftBackend`] seam the saver talks through, the reqwest implementation
//! used in production and an in-memory double for tests.

pub mod http;
pub mod mock;
pub mod types;

pub use http::{BackendSettings, HttpDraftBackend};
pub use mock::{MockDraftBackend, MockFailure};

use async_trait::async_trait;
use invitra_core::{Draft, DraftContent, DraftKey, SaveResult};

/// Persistence calls the saver needs from the remote backend.
///
/// Implementations must be thread-safe (Send + Sync). Neither call is
/// expected to bound its own latency; the saver applies the timeout.
#[async_trait]
pub trait DraftBackend: Send + Sync {
    /// Persist `content` as the draft for `key`.
    ///
    /// # Returns
    /// * `Ok(())` - The backend answered with `status: "success"`
    /// * `Err(SaveError::Rejected)` - Non-2xx status or any other `status`
    /// * `Err(SaveError::Network)` - Transport failure or unreadable body
    async fn save(&self, key: &DraftKey, content: &DraftContent) -> SaveResult<()>;

    /// Fetch the stored draft for `key`.
    ///
    /// # Returns
    /// * `Ok(Some(draft))` - The backend answered with a draft
    /// * `Ok(None)` - The backend answered successfully without `data`
    /// * `Err(_)` - Any failure, with the same taxonomy as [`save`](Self::save)
    async fn load(&self, key: &DraftKey) -> SaveResult<Option<Draft>>;
}
