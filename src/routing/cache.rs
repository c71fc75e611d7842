//! TTL cache of computed routes.
//!
//! Entries are evicted lazily: a lookup that finds an expired entry removes it
//! and reports [`CacheLookup::Stale`]. [`RouteCache::sweep`] clears every
//! expired entry at once.

use crate::env::SharedClock;
use crate::model::Route;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    route: Arc<Route>,
    stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Arc<Route>),
    Miss,
    /// An entry existed but was past its TTL; it has been evicted.
    Stale,
}

pub struct RouteCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: SharedClock,
}

impl RouteCache {
    pub fn new(ttl: std::time::Duration, clock: SharedClock) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
            clock,
        }
    }

    pub fn lookup(&self, key: &str) -> CacheLookup {
        let now = self.clock.now();
        let fresh = match self.entries.get(key) {
            None => return CacheLookup::Miss,
            Some(entry) if now - entry.stored_at < self.ttl => Some(entry.route.clone()),
            Some(_) => None,
        };
        match fresh {
            Some(route) => CacheLookup::Hit(route),
            None => {
                self.entries.remove_if(key, |_, entry| now - entry.stored_at >= self.ttl);
                debug!(key, "Evicted stale route");
                CacheLookup::Stale
            }
        }
    }

    pub fn insert(&self, key: String, route: Arc<Route>) {
        let stored_at = self.clock.now();
        self.entries.insert(key, CacheEntry { route, stored_at });
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut evicted = 0;
        self.entries.retain(|_, entry| {
            let fresh = now - entry.stored_at < self.ttl;
            if !fresh {
                evicted += 1;
            }
            fresh
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
