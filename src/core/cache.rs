//! Cache-aside layer for order detail lookups
//!
//! This module provides two [`DetailsCache`] backends and the
//! [`CacheGateway`] that puts one of them in front of the store.
//!
//! # Read Path
//!
//! ```text
//! get_details_by_order_id ──► cache hit ──► return
//!             │
//!             └─ miss / cache error ──► store ──► best-effort cache set ──► return
//! ```
//!
//! Cache failures are logged and absorbed: an unavailable cache only turns
//! reads into store lookups. List and range queries never go through here.
//!
//! # Dataset Replacement
//!
//! The gateway keeps an epoch that an import bumps, then clears the cache,
//! both before and after the store swap. A lookup only caches what it read if
//! the epoch did not move while it was reading, and drops its entry again if
//! the epoch moved while it was writing. Details of a replaced dataset
//! therefore never outlive the import that replaced them.

use crate::core::traits::{details_key, DetailsCache, OrderRepository};
use crate::types::{OrderDetails, OrderError, OrderId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CachedEntry {
    value: OrderDetails,
    expires_at: Option<Instant>,
}

impl CachedEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Default lifetime of a cached entry
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Configuration of the details cache
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// When false, every lookup goes to the store
    pub enabled: bool,
    /// Entry lifetime; zero means entries never expire
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl CacheConfig {
    /// Build the cache backend this configuration describes
    pub fn build(&self) -> Arc<dyn DetailsCache> {
        match (self.enabled, self.ttl.is_zero()) {
            (false, _) => Arc::new(NoopCache),
            (true, true) => Arc::new(MemoryCache::unbounded()),
            (true, false) => Arc::new(MemoryCache::with_ttl(self.ttl)),
        }
    }
}

/// Thread-safe in-process cache with optional per-entry expiration
///
/// Entries live in a `DashMap`, so lookups for different keys do not block
/// each other. An expired entry is dropped when it is read, and every `set`
/// sweeps out the other expired entries.
#[derive(Debug)]
pub struct MemoryCache {
    entries: DashMap<String, CachedEntry>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Create a cache whose entries expire `ttl` after being set
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    /// Create a cache whose entries never expire
    pub fn unbounded() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: None,
        }
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DetailsCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<OrderDetails>, OrderError> {
        let now = Instant::now();
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some()
        {
            return Ok(None);
        }
        Ok(self.entries.get(key).map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: OrderDetails) -> Result<(), OrderError> {
        let now = Instant::now();
        let expires_at = self.ttl.map(|ttl| now + ttl);
        if self.ttl.is_some() {
            self.entries.retain(|_, entry| !entry.is_expired(now));
        }
        self.entries
            .insert(key.to_string(), CachedEntry { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), OrderError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), OrderError> {
        self.entries.clear();
        Ok(())
    }
}

/// Cache that stores nothing. Every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl DetailsCache for NoopCache {
    fn get(&self, _key: &str) -> Result<Option<OrderDetails>, OrderError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: OrderDetails) -> Result<(), OrderError> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<(), OrderError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), OrderError> {
        Ok(())
    }
}

/// Cache-aside gateway in front of the store's point lookups
#[derive(Clone)]
pub struct CacheGateway {
    cache: Arc<dyn DetailsCache>,
    store: Arc<dyn OrderRepository>,
    epoch: Arc<AtomicU64>,
}

impl CacheGateway {
    /// Put `cache` in front of `store`
    pub fn new(cache: Arc<dyn DetailsCache>, store: Arc<dyn OrderRepository>) -> Self {
        Self {
            cache,
            store,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Details of one order, from the cache when possible
    ///
    /// # Errors
    ///
    /// Only store errors are returned (`NotFound` for an unknown order).
    /// Cache errors never are.
    pub fn get_details_by_order_id(&self, order_id: OrderId) -> Result<OrderDetails, OrderError> {
        let key = details_key(order_id);

        match self.cache.get(&key) {
            Ok(Some(details)) => return Ok(details),
            Ok(None) => tracing::debug!(order_id, "details cache miss"),
            Err(e) => tracing::warn!(order_id, error = %e, "details cache read failed"),
        }

        let epoch = self.epoch.load(Ordering::Acquire);
        let details = self.store.get_details_by_order_id(order_id)?;

        if self.epoch.load(Ordering::Acquire) != epoch {
            tracing::debug!(order_id, "dataset replaced during lookup, not caching");
            return Ok(details);
        }

        if let Err(e) = self.cache.set(&key, details.clone()) {
            tracing::warn!(order_id, error = %e, "details cache write failed");
        }

        // An import may have cleared the cache between the check and the set
        if self.epoch.load(Ordering::Acquire) != epoch {
            self.invalidate(order_id);
        }

        Ok(details)
    }

    /// Mark the start of a dataset replacement and drop every cached entry
    ///
    /// Must be paired with [`CacheGateway::end_replace`] once the store swap
    /// finished or failed.
    pub fn begin_replace(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.clear_all();
    }

    /// Mark the end of a dataset replacement and drop every cached entry
    pub fn end_replace(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.clear_all();
    }

    /// Drop every cached entry
    ///
    /// A failure is logged and ignored.
    pub fn clear_all(&self) {
        if let Err(e) = self.cache.clear() {
            tracing::warn!(error = %e, "details cache clear failed");
        }
    }

    /// Drop the cached entry of one order, if any
    pub fn invalidate(&self, order_id: OrderId) {
        if let Err(e) = self.cache.delete(&details_key(order_id)) {
            tracing::warn!(order_id, error = %e, "details cache delete failed");
        }
    }
}
