//! Data models
//!
//! Immutable value records for accounts, posts and media. Instances
//! are created from upstream fetch results and never mutated; a fresh
//! fetch supersedes the old value instead of editing it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Account
// =============================================================================

/// An upstream account, as seen at lookup time
///
/// The handle is mutable upstream-side but treated here as a
/// point-in-time snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable, upstream-assigned numeric id
    pub id: u64,
    /// Handle without the leading '@'
    pub handle: String,
    pub display_name: String,
}

// =============================================================================
// Media
// =============================================================================

/// A media attachment, referenced (never owned) by a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// Resolved URL of the media file
    pub url: String,
}

// =============================================================================
// Post
// =============================================================================

/// A single post from an account's timeline
///
/// Carries its own author snapshot by value, so a later account
/// metadata refresh does not retroactively alter historical posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Upstream post id; approximately monotonic with creation time
    /// within one account's pagination order. Sole deduplication key.
    pub id: u64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Author snapshot taken when the post was fetched
    pub author: Account,
    /// Ordered media attachments, empty if none
    pub media: Vec<Media>,
}
