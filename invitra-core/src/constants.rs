//! Timing constants for draft saving.

use std::time::Duration;

/// Window during which an identical resubmission of a draft is coalesced
/// into the previous save.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(5_000);

/// Upper bound on the local wait for an outbound save.
pub const SAVE_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Interval of the background expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(30_000);
