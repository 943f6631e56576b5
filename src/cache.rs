use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

/// Hierarchical cache key, e.g. `sos-alerts` / `sos-alerts/active` / `sos-alerts/42`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// True when `prefix` names this key or one of its ancestors
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Age after which a cached value is refetched on next read
    pub stale_time: Duration,
    /// Age after which an entry is dropped entirely by `collect_garbage`
    pub gc_time: Duration,
}

impl CachePolicy {
    pub const fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self { stale_time, gc_time }
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    fetched_at: Instant,
    policy: CachePolicy,
    invalidated: bool,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        !self.invalidated && now.duration_since(self.fetched_at) < self.policy.stale_time
    }
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<Entry>,
    generation: u64,
}

/// Proof that a fetch was started; only the newest ticket for a key may store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// Keyed response cache with staleness windows and explicit invalidation.
///
/// Every `begin_fetch` and every invalidation bumps the key's generation,
/// so a response that was in flight across either is never stored.
#[derive(Debug, Default)]
pub struct QueryCache {
    slots: Mutex<HashMap<QueryKey, Slot>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached value if present and within its staleness window
    pub fn get_fresh(&self, key: &QueryKey) -> Option<Value> {
        let now = Instant::now();
        self.slots()
            .get(key)
            .and_then(|slot| slot.entry.as_ref())
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Cached value regardless of staleness
    pub fn peek(&self, key: &QueryKey) -> Option<Value> {
        self.slots()
            .get(key)
            .and_then(|slot| slot.entry.as_ref())
            .map(|entry| entry.value.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.get_fresh(key).is_none()
    }

    pub fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let mut slots = self.slots();
        let slot = slots.entry(key.clone()).or_default();
        slot.generation += 1;
        FetchTicket {
            key: key.clone(),
            generation: slot.generation,
        }
    }

    /// Store a fetched value; returns false when the ticket was superseded
    pub fn complete(&self, ticket: FetchTicket, value: Value, policy: CachePolicy) -> bool {
        let mut slots = self.slots();
        let slot = slots.entry(ticket.key.clone()).or_default();

        if slot.generation != ticket.generation {
            tracing::debug!("Discarding superseded response for '{}'", ticket.key);
            return false;
        }

        slot.entry = Some(Entry {
            value,
            fetched_at: Instant::now(),
            policy,
            invalidated: false,
        });
        true
    }

    /// Mark every key under `prefix` stale; returns how many cached entries were affected
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut affected = 0;
        for (key, slot) in self.slots().iter_mut() {
            if !key.starts_with(prefix) {
                continue;
            }
            slot.generation += 1;
            if let Some(entry) = slot.entry.as_mut() {
                entry.invalidated = true;
                affected += 1;
            }
        }

        tracing::debug!("Invalidated {} cache entries under '{}'", affected, prefix);
        affected
    }

    /// Drop entries older than their GC window
    pub fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.slots();
        let before = slots.len();
        slots.retain(|_, slot| match &slot.entry {
            Some(entry) => now.duration_since(entry.fetched_at) < entry.policy.gc_time,
            None => true,
        });
        before - slots.len()
    }

    pub fn clear(&self) {
        self.slots().clear();
    }

    pub fn len(&self) -> usize {
        self.slots().values().filter(|slot| slot.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
