//! Incremental synchronization engine
//!
//! Brings one account's post store up to date with the minimum number
//! of upstream calls: only posts newer than the newest one already
//! cached are fetched, bounded by the store's retention window.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::data::{Post, TimeWindowedPostStore};
use crate::error::AppError;
use crate::metrics::{SYNC_DURATION_SECONDS, SYNC_PAGES_TOTAL};
use crate::upstream::{PostsPage, Upstream};

/// Drives paginated fetch-until-caught-up against the upstream client
pub struct IncrementalSyncEngine {
    upstream: Arc<dyn Upstream>,
    page_size: u32,
}

impl IncrementalSyncEngine {
    pub fn new(upstream: Arc<dyn Upstream>, page_size: u32) -> Self {
        Self {
            upstream,
            page_size,
        }
    }

    /// Run one sync pass for an account's store
    ///
    /// The since-id cursor is the id of the newest post currently in
    /// the store (after an implicit prune); the time floor is
    /// `now - store ttl`. Pages are merged as they arrive, so a later
    /// page failure aborts the cycle but keeps the progress already
    /// merged. The next pass resumes naturally because the since-id is
    /// recomputed from the store's new newest post.
    pub async fn refresh(
        &self,
        account_id: u64,
        store: &Mutex<TimeWindowedPostStore>,
    ) -> Result<(), AppError> {
        let timer = SYNC_DURATION_SECONDS.start_timer();
        let result = self.refresh_inner(account_id, store).await;
        timer.observe_duration();
        result
    }

    async fn refresh_inner(
        &self,
        account_id: u64,
        store: &Mutex<TimeWindowedPostStore>,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let (since_id, floor_time) = {
            let mut store = store.lock().await;
            store.prune(now);
            (store.newest_id(now), now - store.ttl())
        };

        let mut cursor: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let page = self
                .upstream
                .fetch_posts_page(
                    account_id,
                    since_id,
                    cursor.as_deref(),
                    floor_time,
                    self.page_size,
                )
                .await?;

            // An empty page ends the pass; on the first call this
            // means no pagination is attempted at all.
            if page.posts.is_empty() {
                break;
            }

            let posts = resolve_page(&page)?;
            {
                let mut store = store.lock().await;
                store.merge(posts, Utc::now());
            }
            SYNC_PAGES_TOTAL.inc();
            pages += 1;

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(account_id, pages, ?since_id, "sync pass complete");
        Ok(())
    }
}

/// Resolve a page's raw records into self-contained posts
///
/// Author and media references must resolve against the page's own
/// included sets; a miss means the upstream response is inconsistent
/// with its expansion contract and fails the whole page.
fn resolve_page(page: &PostsPage) -> Result<Vec<Post>, AppError> {
    page.posts
        .iter()
        .map(|raw| {
            let author = page
                .included_accounts
                .get(&raw.author_id)
                .cloned()
                .ok_or_else(|| {
                    tracing::error!(
                        post_id = raw.id,
                        author_id = raw.author_id,
                        "included accounts are missing a referenced author"
                    );
                    AppError::ProtocolInconsistency(format!(
                        "post {} references author {} absent from included accounts",
                        raw.id, raw.author_id
                    ))
                })?;

            let media = raw
                .media_keys
                .iter()
                .map(|key| {
                    page.included_media.get(key).cloned().ok_or_else(|| {
                        tracing::error!(
                            post_id = raw.id,
                            media_key = %key,
                            "included media are missing a referenced key"
                        );
                        AppError::ProtocolInconsistency(format!(
                            "post {} references media key {key:?} absent from included media",
                            raw.id
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Post {
                id: raw.id,
                text: raw.text.clone(),
                created_at: raw.created_at,
                author,
                media,
            })
        })
        .collect()
}
