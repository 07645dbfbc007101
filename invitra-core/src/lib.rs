//! Invitra Core - Draft Types
//!
//! Data types shared by the draft relay crates: draft identity and content,
//! content fingerprints, the clock abstraction and the error taxonomy.
//! This crate performs no I/O.

pub mod clock;
pub mod constants;
pub mod draft;
pub mod error;
pub mod fingerprint;

pub use clock::{Clock, ManualClock, SystemClock};
pub use constants::{DEFAULT_SWEEP_INTERVAL, DEBOUNCE_WINDOW, SAVE_TIMEOUT};
pub use draft::{Draft, DraftContent, DraftKey, SaveAck, SaveDraftRequest};
pub use error::{ConfigError, SaveError, SaveResult, ValidationError};
pub use fingerprint::DraftFingerprint;

/// Timestamp type using UTC timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
