//! Short-lived cache of rendered reports.
//!
//! Owned by [`AppState`](super::app_state::AppState) and cleared whenever
//! ingestion changes the store.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Stats,
    Analytics,
}

struct CacheEntry {
    body: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

pub struct ReportCache {
    entries: RwLock<HashMap<(ReportKind, u32), CacheEntry>>,
    // Bumped by every invalidate; a report built before the bump is never stored
    generation: AtomicU64,
    ttl: Duration,
}

impl ReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            ttl,
        }
    }

    /// Cached body for a report window, if present and fresh.
    pub fn get(&self, kind: ReportKind, days: u32) -> Option<Value> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&(kind, days))?;

        if entry.is_expired() {
            None
        } else {
            Some(entry.body.clone())
        }
    }

    /// Read before loading the snapshot a report is built from.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store a report built at `generation`. Dropped if the cache was
    /// invalidated since.
    pub fn set(&self, kind: ReportKind, days: u32, generation: u64, body: Value) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut entries) = self.entries.write() {
            if self.generation.load(Ordering::Acquire) != generation {
                return;
            }
            entries.retain(|_, entry| !entry.is_expired());
            entries.insert(
                (kind, days),
                CacheEntry {
                    body,
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }
    }

    pub fn invalidate(&self) {
        let entries = self.entries.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Ok(mut entries) = entries {
            entries.clear();
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}
