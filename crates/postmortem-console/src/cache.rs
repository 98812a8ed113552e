//! Distributed cache backend seam and an in-memory reference implementation.

use dashmap::DashMap;
use postmortem_types::StorageError;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Boxed future returned by cache operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Key/value store with per-entry TTL, shared between processes.
///
/// Values are UTF-8 JSON; keys are namespaced by the caller (the session
/// store uses `session:<id>`). Dyn-compatible so the store works with
/// `Arc<dyn CacheBackend>`.
pub trait CacheBackend: Send + Sync {
    /// Store `value` under `key`, expiring it after `ttl`.
    fn set_with_ttl<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
        ttl: Duration,
    ) -> CacheFuture<'a, ()>;

    /// Fetch the value under `key`, or `None` if absent or expired.
    fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>>;

    /// Remove the value under `key`. Removing an absent key is not an error.
    fn delete<'a>(&'a self, key: &'a str) -> CacheFuture<'a, ()>;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory [`CacheBackend`] with TTL expiry.
///
/// Stands in for an external cache in tests and single-process deployments.
/// Expired entries are removed on access and swept opportunistically on
/// write.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, Entry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| now < entry.expires_at);
    }
}

impl CacheBackend for InMemoryCache {
    fn set_with_ttl<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
        ttl: Duration,
    ) -> CacheFuture<'a, ()> {
        Box::pin(async move {
            self.sweep_expired();
            self.entries.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at: Instant::now() + ttl,
                },
            );
            Ok(())
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
        Box::pin(async move {
            let now = Instant::now();
            let expired = self
                .entries
                .remove_if(key, |_, entry| now >= entry.expires_at)
                .is_some();
            if expired {
                return Ok(None);
            }
            Ok(self.entries.get(key).map(|entry| entry.value.clone()))
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> CacheFuture<'a, ()> {
        Box::pin(async move {
            self.entries.remove(key);
            Ok(())
        })
    }
}
