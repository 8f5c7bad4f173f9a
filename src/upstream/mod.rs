//! Upstream API collaborators
//!
//! The cache/sync core talks to the upstream service only through the
//! [`Upstream`] trait, so the HTTP client can be swapped for a fake
//! in tests.

mod twitter;

pub use twitter::TwitterApi;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::data::{Account, Media};
use crate::error::AppError;

#[cfg(test)]
use mockall::automock;

/// One raw post record as returned by the upstream, before its
/// author and media references are resolved.
#[derive(Debug, Clone)]
pub struct RawPost {
    pub id: u64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Reference into the page's included accounts
    pub author_id: u64,
    /// References into the page's included media, ordered
    pub media_keys: Vec<String>,
}

/// A single page of posts with its expansion sets and continuation cursor
#[derive(Debug, Clone, Default)]
pub struct PostsPage {
    pub posts: Vec<RawPost>,
    /// Accounts referenced by this page's posts, keyed by id
    pub included_accounts: HashMap<u64, Account>,
    /// Media referenced by this page's posts, keyed by media key
    pub included_media: HashMap<String, Media>,
    /// Present when more pages are available
    pub next_cursor: Option<String>,
}

/// Upstream API client contract
///
/// Errors are surfaced as-is: `AppError::NotFound` for a missing
/// account, `AppError::Upstream`/`AppError::HttpClient` for transient
/// failures. Nothing is cached at this layer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn lookup_account_by_id(&self, id: u64) -> Result<Account, AppError>;

    async fn lookup_account_by_handle(&self, handle: &str) -> Result<Account, AppError>;

    /// Fetch one page of posts for an account
    ///
    /// Returns posts newer than `since_id` (when given) and not older
    /// than `not_older_than`, with author and media expansions.
    /// `cursor` continues a previous page's pagination.
    async fn fetch_posts_page<'a>(
        &self,
        account_id: u64,
        since_id: Option<u64>,
        cursor: Option<&'a str>,
        not_older_than: DateTime<Utc>,
        page_size: u32,
    ) -> Result<PostsPage, AppError>;
}
