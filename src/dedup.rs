//! Short-lived deduplication cache for at-least-once event delivery.
//!
//! Slack may deliver the same event more than once. Each processed event
//! records `idempotency key → acting user` for a short TTL; a repeat by the
//! same user inside that window is suppressed. Expired entries are ignored on
//! lookup and purged in bulk by [`DedupCache::sweep`], which the scheduler
//! runs on a fixed interval.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default lifetime of a dedup entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default interval between background sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
struct DedupEntry {
    actor: String,
    expires_at: Instant,
}

impl DedupEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Time-windowed map of idempotency key to acting user.
#[derive(Debug)]
pub struct DedupCache {
    entries: DashMap<String, DedupEntry>,
    ttl: Duration,
}

impl DedupCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Atomically check whether `actor` already triggered `key`, and mark it if not.
    ///
    /// Returns `true` for a duplicate. A duplicate leaves the existing entry
    /// (and its expiry) untouched; any other outcome stores `key → actor` with
    /// a fresh TTL, overwriting an entry left by a different actor.
    pub fn check_and_mark(&self, key: &str, actor: &str) -> bool {
        let now = Instant::now();
        let fresh = DedupEntry {
            actor: actor.to_string(),
            expires_at: now + self.ttl,
        };

        // The entry guard holds the shard lock, so check and insert are one step.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get();
                if !existing.is_expired(now) && existing.actor == actor {
                    return true;
                }
                occupied.insert(fresh);
                false
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                false
            }
        }
    }

    /// Remove every expired entry. Returns how many were purged.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!("Dedup sweep purged {} expired entries", purged);
        }
        purged
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
