//! Invitra Drafts - debounced bulk-draft saving
//!
//! The form builder autosaves the whole draft (guest names, template text,
//! checklist) on every edit burst. Most of those saves repeat content the
//! backend already has. [`DraftSaver`] forwards a save only when the content
//! changed, or when the previous identical save is older than the debounce
//! window, and reads drafts straight through to the backend.
//!
//! # Example
//!
//! ```ignore
//! let backend = Arc::new(HttpDraftBackend::new(&settings)?);
//! let saver = DraftSaver::with_defaults(backend);
//!
//! let key = DraftKey::new("42", "wedding-a")?;
//! let content = DraftContent::new("Alice,Bob", "Join us on the 5th");
//!
//! saver.save_draft(&key, &content).await?; // forwarded
//! saver.save_draft(&key, &content).await?; // coalesced, no network call
//! ```

pub mod backend;
pub mod cache;
pub mod saver;
pub mod sweeper;

pub use backend::{BackendSettings, DraftBackend, HttpDraftBackend, MockDraftBackend, MockFailure};
pub use cache::{CacheEntry, DedupStats, DraftCache};
pub use saver::{DedupConfig, DraftSaver};
pub use sweeper::{spawn_sweeper, sweep_task};
