//! Background expiry sweep for the dedup cache.
//!
//! Saves already sweep inline, but a key that stops receiving saves would
//! otherwise keep its entry until some other save happens. This task reclaims
//! those entries on a fixed interval. Correctness never depends on it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::cache::DraftCache;

/// Sweep `cache` every `every` until `shutdown_rx` carries `true`.
///
/// Returns the total number of entries this task removed.
pub async fn sweep_task(
    cache: Arc<DraftCache>,
    every: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> u64 {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut total: u64 = 0;

    tracing::info!(
        interval_ms = every.as_millis() as u64,
        "Draft cache sweeper started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped sender also means shutdown.
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }

            _ = ticker.tick() => {
                let removed = cache.sweep_expired();
                total += removed as u64;
                if removed > 0 {
                    tracing::debug!(removed, remaining = cache.len(), "Swept expired draft entries");
                } else {
                    tracing::trace!("Draft cache sweep found nothing to remove");
                }
            }
        }
    }

    tracing::info!(swept_total = total, "Draft cache sweeper stopped");
    total
}

/// Spawn [`sweep_task`] on the current runtime.
pub fn spawn_sweeper(
    cache: Arc<DraftCache>,
    every: Duration,
    shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<u64> {
    tokio::spawn(sweep_task(cache, every, shutdown_rx))
}
