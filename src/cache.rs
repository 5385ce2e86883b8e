//! Route-level response cache.
//!
//! Rendered GET responses are cached per (account scope, path) with a TTL.
//! Every mutation carries a caller-supplied path and invalidates that path
//! after the change commits; invalidation is path-wide, dropping the entry
//! for every scope.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::debug;

/// Default cache entry lifetime.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

#[derive(Debug)]
struct Entry {
    body: String,
    stored_at: Instant,
}

/// In-process cache of rendered route bodies.
#[derive(Debug)]
pub struct RouteCache {
    entries: RwLock<HashMap<(String, String), Entry>>,
    ttl: Duration,
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteCache {
    /// Create a cache with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Get a cached body for a scope and path, if present and fresh.
    pub fn get(&self, scope: &str, path: &str) -> Option<String> {
        let entries = self.entries.read().expect("route cache lock poisoned");
        let entry = entries.get(&(scope.to_string(), path.to_string()))?;

        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }

        Some(entry.body.clone())
    }

    /// Store a rendered body for a scope and path.
    pub fn put(&self, scope: &str, path: &str, body: String) {
        let mut entries = self.entries.write().expect("route cache lock poisoned");
        entries.insert(
            (scope.to_string(), path.to_string()),
            Entry {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    /// Invalidate a path for every scope.
    pub fn invalidate(&self, path: &str) {
        let mut entries = self.entries.write().expect("route cache lock poisoned");
        let before = entries.len();
        entries.retain(|(_, entry_path), _| entry_path != path);

        let removed = before - entries.len();
        if removed > 0 {
            debug!(path = %path, removed = removed, "Invalidated route cache");
        }
    }

    /// Drop expired entries to bound memory growth.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().expect("route cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Number of live entries (fresh or not yet purged).
    pub fn len(&self) -> usize {
        self.entries.read().expect("route cache lock poisoned").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
