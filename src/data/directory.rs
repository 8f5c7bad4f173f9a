//! Account directory
//!
//! Resolves account metadata through two TTL caches (by id and by
//! handle). A hit on either key warms the other. Uses Moka for
//! concurrent caching, like the rest of the cache layer.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::models::Account;
use crate::error::AppError;
use crate::metrics::{CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL, CACHE_SIZE};
use crate::upstream::Upstream;

/// TTL-bounded lookup cache for account metadata
///
/// Entries expire a fixed time after insertion, independent of
/// access. Lookup failures are surfaced uncached so the next call
/// retries against upstream.
pub struct AccountDirectory {
    by_id: Cache<u64, Account>,
    by_handle: Cache<String, Account>,
    upstream: Arc<dyn Upstream>,
}

impl AccountDirectory {
    /// Create a new directory
    ///
    /// # Arguments
    /// * `upstream` - Account lookup collaborator
    /// * `capacity` - Maximum entries per cache
    /// * `ttl` - Entry lifetime, counted from insertion
    pub fn new(upstream: Arc<dyn Upstream>, capacity: u64, ttl: Duration) -> Self {
        let by_id = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        let by_handle = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self {
            by_id,
            by_handle,
            upstream,
        }
    }

    /// Resolve an account by its upstream id
    pub async fn resolve_by_id(&self, id: u64) -> Result<Account, AppError> {
        if let Some(account) = self.by_id.get(&id).await {
            CACHE_HITS_TOTAL.with_label_values(&["account_by_id"]).inc();
            return Ok(account);
        }
        CACHE_MISSES_TOTAL
            .with_label_values(&["account_by_id"])
            .inc();

        let account = self.upstream.lookup_account_by_id(id).await?;
        self.populate(&account).await;
        Ok(account)
    }

    /// Resolve an account by handle (leading '@' tolerated)
    pub async fn resolve_by_handle(&self, handle: &str) -> Result<Account, AppError> {
        let key = normalize_handle(handle);
        if let Some(account) = self.by_handle.get(&key).await {
            CACHE_HITS_TOTAL
                .with_label_values(&["account_by_handle"])
                .inc();
            return Ok(account);
        }
        CACHE_MISSES_TOTAL
            .with_label_values(&["account_by_handle"])
            .inc();

        let account = self.upstream.lookup_account_by_handle(&key).await?;
        self.populate(&account).await;
        Ok(account)
    }

    /// Write a fresh account into both caches
    ///
    /// Cross-population: a lookup by one key warms the other.
    async fn populate(&self, account: &Account) {
        self.by_id.insert(account.id, account.clone()).await;
        self.by_handle
            .insert(normalize_handle(&account.handle), account.clone())
            .await;

        CACHE_SIZE
            .with_label_values(&["account_by_id"])
            .set(self.by_id.entry_count() as i64);
        CACHE_SIZE
            .with_label_values(&["account_by_handle"])
            .set(self.by_handle.entry_count() as i64);
    }
}

/// Handles are case-insensitive upstream
fn normalize_handle(handle: &str) -> String {
    handle.trim_start_matches('@').to_ascii_lowercase()
}
