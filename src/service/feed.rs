//! Feed service
//!
//! Implements the exposed feed contract: resolve the account, obtain
//! its store, refresh it incrementally, return the current contents
//! newest-first.

use chrono::Utc;
use std::sync::Arc;

use crate::data::{Account, AccountDirectory, Post, StoreRegistry};
use crate::error::AppError;
use crate::sync::IncrementalSyncEngine;

/// Feed service
pub struct FeedService {
    directory: Arc<AccountDirectory>,
    registry: Arc<StoreRegistry>,
    engine: Arc<IncrementalSyncEngine>,
}

impl FeedService {
    /// Create new feed service
    pub fn new(
        directory: Arc<AccountDirectory>,
        registry: Arc<StoreRegistry>,
        engine: Arc<IncrementalSyncEngine>,
    ) -> Self {
        Self {
            directory,
            registry,
            engine,
        }
    }

    /// Resolve a handle to its account, for redirecting to the
    /// canonical by-id route
    pub async fn resolve_handle(&self, handle: &str) -> Result<Account, AppError> {
        self.directory.resolve_by_handle(handle).await
    }

    /// Get an account's feed, newest-first
    ///
    /// Triggers at most one synchronization pass for the account.
    /// Sync failures surface to the caller; whatever was merged
    /// before the failure stays cached for the next attempt.
    pub async fn feed_by_id(&self, account_id: u64) -> Result<(Account, Vec<Post>), AppError> {
        let account = self.directory.resolve_by_id(account_id).await?;

        let store = self.registry.get_or_create(account_id).await;
        self.engine.refresh(account_id, &store).await?;

        let posts = {
            let mut store = store.lock().await;
            store.posts(Utc::now()).to_vec()
        };

        Ok((account, posts))
    }
}
