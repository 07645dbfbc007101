//! In-memory dedup cache for draft saves.
//!
//! One entry per [`DraftKey`], holding the fingerprint of the last content
//! the backend accepted and when it was accepted. The cache is an
//! optimization only: losing it costs at most one redundant save.
//!
//! # Entry lifecycle
//!
//! ```text
//! Absent ──record──▶ Fresh(fp, t) ──record──▶ Fresh(fp', t')
//!                         │
//!                         └──sweep (age >= window)──▶ Absent
//! ```
//!
//! Suppressed saves never touch the entry, so a steady stream of identical
//! saves still reaches the backend once per window.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use invitra_core::{Clock, DraftFingerprint, DraftKey, Timestamp};
use serde::Serialize;

/// Last accepted content for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub fingerprint: DraftFingerprint,
    pub recorded_at: Timestamp,
}

impl CacheEntry {
    fn age(&self, now: Timestamp) -> Duration {
        now.signed_duration_since(self.recorded_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Snapshot of cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Entries currently held, expired or not.
    pub entries: usize,
    /// Saves answered from the cache without a network call.
    pub saves_suppressed: u64,
    /// Saves the backend accepted.
    pub saves_recorded: u64,
    /// Entries removed by expiry sweeps.
    pub entries_swept: u64,
}

/// Dedup cache keyed by [`DraftKey`].
///
/// Backed by a sharded concurrent map, so sweeps and lookups of unrelated
/// keys do not serialize on one lock.
pub struct DraftCache {
    entries: DashMap<DraftKey, CacheEntry>,
    clock: Arc<dyn Clock>,
    debounce_window: Duration,
    saves_suppressed: AtomicU64,
    saves_recorded: AtomicU64,
    entries_swept: AtomicU64,
}

impl DraftCache {
    pub fn new(clock: Arc<dyn Clock>, debounce_window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            debounce_window,
            saves_suppressed: AtomicU64::new(0),
            saves_recorded: AtomicU64::new(0),
            entries_swept: AtomicU64::new(0),
        }
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    fn is_expired(&self, entry: &CacheEntry, now: Timestamp) -> bool {
        entry.age(now) >= self.debounce_window
    }

    /// Returns true if `fingerprint` matches the last accepted content for
    /// `key` and that acceptance is still inside the debounce window.
    ///
    /// A `true` answer is counted as a suppressed save. The entry itself is
    /// left as is.
    pub fn is_duplicate(&self, key: &DraftKey, fingerprint: &DraftFingerprint) -> bool {
        let now = self.clock.now();
        let duplicate = self
            .entries
            .get(key)
            .map(|entry| entry.fingerprint == *fingerprint && !self.is_expired(&entry, now))
            .unwrap_or(false);

        if duplicate {
            self.saves_suppressed.fetch_add(1, Ordering::Relaxed);
        }
        duplicate
    }

    /// Record content the backend accepted for `key`.
    ///
    /// The stored timestamp never moves backwards, even if the clock does.
    pub fn record(&self, key: DraftKey, fingerprint: DraftFingerprint) {
        let now = self.clock.now();
        self.entries
            .entry(key)
            .and_modify(|entry| {
                entry.fingerprint = fingerprint;
                entry.recorded_at = entry.recorded_at.max(now);
            })
            .or_insert(CacheEntry {
                fingerprint,
                recorded_at: now,
            });
        self.saves_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;
        self.entries.retain(|_, entry| {
            let keep = !self.is_expired(entry, now);
            if !keep {
                removed += 1;
            }
            keep
        });

        self.entries_swept
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Current entry for `key`, expired or not.
    pub fn get(&self, key: &DraftKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| *entry)
    }

    pub fn contains(&self, key: &DraftKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> DedupStats {
        DedupStats {
            entries: self.entries.len(),
            saves_suppressed: self.saves_suppressed.load(Ordering::Relaxed),
            saves_recorded: self.saves_recorded.load(Ordering::Relaxed),
            entries_swept: self.entries_swept.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for DraftCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftCache")
            .field("entries", &self.entries.len())
            .field("debounce_window", &self.debounce_window)
            .finish()
    }
}
