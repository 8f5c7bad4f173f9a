//! Time-windowed post store
//!
//! Holds a single account's in-window posts, sorted newest-first.
//! Expiry is lazy: every read and write prunes first, so stale
//! entries are never observed even if no write happened recently.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use super::models::Post;

/// Per-account store of recent posts with TTL-based eviction
///
/// Posts are kept sorted by `created_at` descending with no
/// duplicate ids. Nothing older than `now - ttl` survives a prune.
pub struct TimeWindowedPostStore {
    ttl: Duration,
    /// Sorted newest-first
    posts: Vec<Post>,
}

impl TimeWindowedPostStore {
    /// Create an empty store with the given retention window
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            posts: Vec::new(),
        }
    }

    /// Retention window; also defines the sync floor
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Remove every post older than `now - ttl`
    ///
    /// The stored sequence is sorted newest-first, so the cut index is
    /// found with a binary search and the expired suffix truncated:
    /// O(log n + k) where k is the number removed.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let horizon = now - self.ttl;
        let cut = self
            .posts
            .partition_point(|post| post.created_at >= horizon);
        if cut < self.posts.len() {
            tracing::debug!(removed = self.posts.len() - cut, "pruned expired posts");
            self.posts.truncate(cut);
        }
    }

    /// Merge freshly fetched posts into the store
    ///
    /// Prunes first, then unions `new_posts` with the retained posts.
    /// Ids are deduplicated preferring the newly fetched copy, and the
    /// union is re-sorted by `created_at` descending rather than
    /// trusting the upstream page order.
    pub fn merge(&mut self, new_posts: Vec<Post>, now: DateTime<Utc>) {
        self.prune(now);

        let mut seen: HashSet<u64> = HashSet::with_capacity(new_posts.len() + self.posts.len());
        let mut merged: Vec<Post> = Vec::with_capacity(new_posts.len() + self.posts.len());
        for post in new_posts.into_iter().chain(self.posts.drain(..)) {
            if seen.insert(post.id) {
                merged.push(post);
            }
        }
        merged.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        self.posts = merged;
    }

    /// All in-window posts, newest-first
    pub fn posts(&mut self, now: DateTime<Utc>) -> &[Post] {
        self.prune(now);
        &self.posts
    }

    /// Post at `index`, or `None` if out of range
    ///
    /// `get(0, now)` on an empty store is the "no prior sync point"
    /// signal, not a panic.
    pub fn get(&mut self, index: usize, now: DateTime<Utc>) -> Option<&Post> {
        self.prune(now);
        self.posts.get(index)
    }

    /// Id of the newest in-window post, if any
    pub fn newest_id(&mut self, now: DateTime<Utc>) -> Option<u64> {
        self.prune(now);
        self.posts.first().map(|post| post.id)
    }

    /// Number of in-window posts
    pub fn len(&mut self, now: DateTime<Utc>) -> usize {
        self.prune(now);
        self.posts.len()
    }

    pub fn is_empty(&mut self, now: DateTime<Utc>) -> bool {
        self.len(now) == 0
    }
}
