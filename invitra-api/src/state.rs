//! Shared handler state.

use invitra_drafts::DraftSaver;

/// State handed to every route.
///
/// [`DraftSaver`] is itself a cheap handle around shared parts, so the state
/// clones per request without an outer `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub saver: DraftSaver,
}

impl AppState {
    pub fn new(saver: DraftSaver) -> Self {
        Self { saver }
    }
}
