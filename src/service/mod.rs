//! Service layer
//!
//! Business logic tying the directory, registry and sync engine
//! together behind the feed contract.

mod feed;

pub use feed::FeedService;
