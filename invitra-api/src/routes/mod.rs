//! Route modules for the relay.

pub mod drafts;
pub mod health;

pub use drafts::{LoadDraftQuery, LoadDraftResponse, SaveDraftBody, DRAFTS_PATH};
pub use health::HealthResponse;
