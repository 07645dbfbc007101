//! In-memory backend double.

use super::DraftBackend;
use async_trait::async_trait;
use invitra_core::{Draft, DraftContent, DraftKey, SaveError, SaveResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Failure the mock injects into every call while set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Answer with `status: "error"`.
    Reject,
    /// Fail as if the connection dropped.
    Network,
    /// Never answer.
    Hang,
}

/// Mock backend for testing.
/// Stores drafts in memory and counts every call it receives.
#[derive(Debug, Default)]
pub struct MockDraftBackend {
    drafts: Mutex<HashMap<DraftKey, Draft>>,
    save_calls: AtomicUsize,
    load_calls: AtomicUsize,
    failure: Mutex<Option<MockFailure>>,
}

impl MockDraftBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails every call with `failure`.
    pub fn failing(failure: MockFailure) -> Self {
        let mock = Self::default();
        mock.set_failure(Some(failure));
        mock
    }

    /// Change the injected failure; `None` restores normal behavior.
    pub fn set_failure(&self, failure: Option<MockFailure>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = failure;
    }

    /// Seed a stored draft.
    pub fn insert(&self, key: DraftKey, draft: Draft) {
        self.drafts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, draft);
    }

    pub fn stored(&self, key: &DraftKey) -> Option<Draft> {
        self.drafts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Number of save calls received, successful or not.
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Number of load calls received, successful or not.
    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    fn current_failure(&self) -> Option<MockFailure> {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn fail(failure: MockFailure) -> SaveError {
        match failure {
            MockFailure::Reject => SaveError::rejected(Some("Mock backend rejected the call".to_string())),
            MockFailure::Network => SaveError::network("connection reset by peer"),
            MockFailure::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl DraftBackend for MockDraftBackend {
    async fn save(&self, key: &DraftKey, content: &DraftContent) -> SaveResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.current_failure() {
            return Err(Self::fail(failure).await);
        }

        let draft = Draft {
            names_list: content.names_list.clone(),
            template_text: content.template_text.clone(),
            checklist_data: content.checklist_data.clone(),
            updated_at: None,
        };
        self.insert(key.clone(), draft);
        Ok(())
    }

    async fn load(&self, key: &DraftKey) -> SaveResult<Option<Draft>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.current_failure() {
            return Err(Self::fail(failure).await);
        }
        Ok(self.stored(key))
    }
}
