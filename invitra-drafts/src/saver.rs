//! Debounced draft saving and read-through loading.

use std::sync::Arc;
use std::time::Duration;

use invitra_core::{
    Clock, Draft, DraftContent, DraftFingerprint, DraftKey, SaveAck, SaveError, SaveResult,
    SystemClock, DEBOUNCE_WINDOW, SAVE_TIMEOUT,
};

use crate::backend::DraftBackend;
use crate::cache::{DedupStats, DraftCache};

/// Timing configuration for the saver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupConfig {
    /// Identical saves closer together than this are coalesced.
    pub debounce_window: Duration,
    /// Upper bound on the local wait for any backend call.
    pub save_timeout: Duration,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            debounce_window: DEBOUNCE_WINDOW,
            save_timeout: SAVE_TIMEOUT,
        }
    }
}

impl DedupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_save_timeout(mut self, timeout: Duration) -> Self {
        self.save_timeout = timeout;
        self
    }
}

/// Front door for draft persistence.
///
/// Cheap to clone; clones share the backend and the dedup cache.
#[derive(Clone)]
pub struct DraftSaver {
    backend: Arc<dyn DraftBackend>,
    cache: Arc<DraftCache>,
    config: DedupConfig,
}

impl DraftSaver {
    pub fn new(backend: Arc<dyn DraftBackend>, clock: Arc<dyn Clock>, config: DedupConfig) -> Self {
        let cache = Arc::new(DraftCache::new(clock, config.debounce_window));
        Self {
            backend,
            cache,
            config,
        }
    }

    /// Saver on the system clock with the default timings.
    pub fn with_defaults(backend: Arc<dyn DraftBackend>) -> Self {
        Self::new(backend, Arc::new(SystemClock::new()), DedupConfig::default())
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<DraftCache> {
        &self.cache
    }

    pub fn stats(&self) -> DedupStats {
        self.cache.stats()
    }

    /// Save `content` as the draft for `key`, unless the backend already
    /// accepted identical content for `key` within the debounce window.
    ///
    /// A coalesced save returns the same [`SaveAck`] as a forwarded one.
    /// Failed saves leave the cache untouched, so the next attempt with the
    /// same content is forwarded.
    ///
    /// # Errors
    /// * `SaveError::Timeout` - No answer within `save_timeout`; the backend
    ///   may still apply the save
    /// * `SaveError::Rejected` - The backend declined the draft
    /// * `SaveError::Network` - Transport failure or unreadable response
    pub async fn save_draft(&self, key: &DraftKey, content: &DraftContent) -> SaveResult<SaveAck> {
        let fingerprint = DraftFingerprint::of(content);

        if self.cache.is_duplicate(key, &fingerprint) {
            tracing::debug!(
                user_id = key.user_id(),
                invitation_title = key.invitation_title(),
                %fingerprint,
                "Draft unchanged inside debounce window, skipping save"
            );
            return Ok(SaveAck::success());
        }

        let outcome =
            tokio::time::timeout(self.config.save_timeout, self.backend.save(key, content)).await;

        match outcome {
            Err(_) => {
                let err = SaveError::Timeout {
                    after: self.config.save_timeout,
                };
                tracing::warn!(
                    user_id = key.user_id(),
                    invitation_title = key.invitation_title(),
                    error = %err,
                    "Draft save timed out"
                );
                Err(err)
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    user_id = key.user_id(),
                    invitation_title = key.invitation_title(),
                    error = %err,
                    "Draft save failed"
                );
                Err(err)
            }
            Ok(Ok(())) => {
                self.cache.record(key.clone(), fingerprint);
                let swept = self.cache.sweep_expired();
                tracing::info!(
                    user_id = key.user_id(),
                    invitation_title = key.invitation_title(),
                    %fingerprint,
                    swept,
                    "Draft saved"
                );
                Ok(SaveAck::success())
            }
        }
    }

    /// Fetch the stored draft for `key` from the backend.
    ///
    /// Every failure, including a timeout, is logged and reported as `None`:
    /// callers start from an empty draft either way. Never consults the
    /// dedup cache.
    pub async fn load_draft(&self, key: &DraftKey) -> Option<Draft> {
        let outcome = tokio::time::timeout(self.config.save_timeout, self.backend.load(key)).await;

        match outcome {
            Ok(Ok(Some(draft))) => Some(draft),
            Ok(Ok(None)) => {
                tracing::debug!(
                    user_id = key.user_id(),
                    invitation_title = key.invitation_title(),
                    "No stored draft"
                );
                None
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    user_id = key.user_id(),
                    invitation_title = key.invitation_title(),
                    error = %err,
                    "Draft load failed"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    user_id = key.user_id(),
                    invitation_title = key.invitation_title(),
                    timeout_ms = self.config.save_timeout.as_millis() as u64,
                    "Draft load timed out"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for DraftSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftSaver")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
