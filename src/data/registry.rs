//! Store registry
//!
//! Bounds the number of simultaneously-tracked accounts. Stores are
//! created lazily on first access and evicted only by LRU pressure;
//! eviction is a cost-control mechanism, a dropped store is simply
//! rebuilt from scratch on next access.

use chrono::Duration;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::store::TimeWindowedPostStore;
use crate::metrics::CACHE_SIZE;

/// LRU-bounded mapping from account id to its post store
///
/// Each store is wrapped in its own mutex so syncs for different
/// accounts proceed in parallel while mutations on one store are
/// serialized.
pub struct StoreRegistry {
    stores: Mutex<LruCache<u64, Arc<Mutex<TimeWindowedPostStore>>>>,
    store_ttl: Duration,
}

impl StoreRegistry {
    /// Create a new registry
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of tracked accounts
    /// * `store_ttl` - Retention window for every created store
    pub fn new(capacity: NonZeroUsize, store_ttl: Duration) -> Self {
        Self {
            stores: Mutex::new(LruCache::new(capacity)),
            store_ttl,
        }
    }

    /// Return the account's store, creating an empty one if absent
    ///
    /// Marks the entry most-recently-used. When capacity is exceeded
    /// the least-recently-accessed account's entire store is dropped.
    pub async fn get_or_create(&self, account_id: u64) -> Arc<Mutex<TimeWindowedPostStore>> {
        let mut stores = self.stores.lock().await;

        if let Some(store) = stores.get(&account_id) {
            return store.clone();
        }

        let store = Arc::new(Mutex::new(TimeWindowedPostStore::new(self.store_ttl)));
        if let Some((evicted_id, _)) = stores.push(account_id, store.clone()) {
            tracing::debug!(account_id = evicted_id, "evicted least-recently-used store");
        }

        CACHE_SIZE
            .with_label_values(&["post_stores"])
            .set(stores.len() as i64);

        store
    }

    /// Whether a store is currently tracked, without touching recency
    pub async fn contains(&self, account_id: u64) -> bool {
        self.stores.lock().await.peek(&account_id).is_some()
    }

    /// Number of tracked accounts
    pub async fn len(&self) -> usize {
        self.stores.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
