//! Shared in-memory state for the polling loops and the HTTP layer.
//!
//! There is no persistent store: each poller overwrites its slice of the
//! [`Snapshot`] wholesale on a successful cycle and leaves it untouched
//! on failure (stale-but-available beats blank). The independent feed
//! ingredients are recombined into a forecast only at request time, so
//! the unsynchronized pollers never need to coordinate.

use crate::models::{
    DisturbanceState, InterplanetaryShock, Sighting, SolarWindSample, TimeSample, TownStatus,
};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

// ---

/// The latest ingredients from every polling loop.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    // ---
    /// Merged solar wind history (plasma + IMF), ascending by time.
    pub wind: Vec<SolarWindSample>,
    /// GOES Hp series keyed by satellite id.
    pub goes: HashMap<String, Vec<TimeSample>>,
    /// Ground disturbance, `None` while unavailable ("System Offline").
    pub disturbance: Option<DisturbanceState>,
    /// Town visibility tiers derived from `disturbance`.
    pub towns: Vec<TownStatus>,
    /// Server-supplied base aurora score, 0–100.
    pub base_score: Option<f64>,
    pub sightings: Vec<Sighting>,
    pub shocks: Vec<InterplanetaryShock>,
}

/// Process-wide state handle shared by pollers and routes.
#[derive(Debug, Default)]
pub struct SharedState {
    // ---
    snapshot: RwLock<Snapshot>,
    pub cache: TtlCache,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone out the current snapshot. Cheap enough at these data sizes
    /// and keeps readers free of lock-holding.
    pub fn snapshot(&self) -> Snapshot {
        // ---
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Apply one poller's update to the snapshot.
    pub fn update<F: FnOnce(&mut Snapshot)>(&self, f: F) {
        // ---
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }
}

// ---

/// A small injected key/value cache with per-entry TTL.
///
/// Replaces ad hoc module-global cache objects and string-keyed cooldown
/// maps: constructed once per process, passed where needed, and exposing
/// only `get`/`set`/`invalidate`.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, (Instant, serde_json::Value)>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a live entry; expired entries are dropped on access.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        // ---
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.get(key) {
            Some((expires, value)) if *expires > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        // ---
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), (Instant::now() + ttl, value));
    }

    pub fn invalidate(&self, key: &str) {
        // ---
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_round_trip_and_invalidate() {
        // ---
        let cache = TtlCache::new();
        cache.set("summary", json!({"stations": 2}), Duration::from_secs(60));
        assert_eq!(cache.get("summary"), Some(json!({"stations": 2})));
        cache.invalidate("summary");
        assert_eq!(cache.get("summary"), None);
    }

    #[test]
    fn test_cache_expires() {
        // ---
        let cache = TtlCache::new();
        cache.set("k", json!(1), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_snapshot_updates_are_partial() {
        // ---
        let state = SharedState::new();
        state.update(|s| s.base_score = Some(37.0));
        state.update(|s| {
            s.wind.push(SolarWindSample {
                t: 1,
                by: 0.0,
                bz: -3.0,
                bt: 3.0,
                speed: 400.0,
                density: 4.0,
            })
        });
        let snap = state.snapshot();
        // One poller's write does not clobber another's slice.
        assert_eq!(snap.base_score, Some(37.0));
        assert_eq!(snap.wind.len(), 1);
    }
}
