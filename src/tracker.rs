//! In-flight redirect tracker
//!
//! When the coordinator opens a replacement tab, the browser immediately reports a
//! navigation for that tab to the very URL we asked for. The tracker remembers
//! `tab → url` for each tab we created so the engine can recognize that event as
//! our own and not redirect it again.
//!
//! Entries are consumed by the first check against their tab. The registry is
//! bounded: entries older than the TTL are purged on access, and when full the
//! oldest entry is evicted.

use crate::config::TrackerConfig;
use crate::types::TabId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct InFlightEntry {
    url: String,
    recorded_at: Instant,
}

/// Outcome of checking a navigation against the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlightCheck {
    /// The navigation is the one the coordinator caused; entry consumed
    Suppressed,
    /// The tab had an entry for another URL; entry dropped, evaluate normally
    Cleared,
    /// No entry for this tab
    Untracked,
}

pub struct InFlightTracker {
    entries: Mutex<HashMap<TabId, InFlightEntry>>,
    capacity: usize,
    ttl: Duration,
}

impl InFlightTracker {
    pub const DEFAULT_CAPACITY: usize = 256;
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.capacity, Duration::from_secs(config.ttl_secs))
    }

    /// Remember that `tab_id` was created to load `url`
    pub fn record(&self, tab_id: TabId, url: impl Into<String>) {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge_stale(&mut entries, now, self.ttl);

        if entries.len() >= self.capacity && !entries.contains_key(&tab_id) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.recorded_at)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                debug!(tab_id = %oldest, "Evicting oldest in-flight entry at capacity");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            tab_id,
            InFlightEntry {
                url: url.into(),
                recorded_at: now,
            },
        );
    }

    /// Check a navigation on `tab_id` and consume any entry for that tab
    pub fn check(&self, tab_id: TabId, url: &str) -> InFlightCheck {
        let mut entries = self.entries.lock();
        Self::purge_stale(&mut entries, Instant::now(), self.ttl);

        match entries.remove(&tab_id) {
            Some(entry) if entry.url == url => InFlightCheck::Suppressed,
            Some(entry) => {
                trace!(tab_id = %tab_id, pending = %entry.url, url, "Tab moved on from in-flight URL");
                InFlightCheck::Cleared
            }
            None => InFlightCheck::Untracked,
        }
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.entries.lock().contains_key(&tab_id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_stale(entries: &mut HashMap<TabId, InFlightEntry>, now: Instant, ttl: Duration) {
        entries.retain(|_, entry| now.duration_since(entry.recorded_at) < ttl);
    }
}

impl Default for InFlightTracker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Self::DEFAULT_TTL)
    }
}
