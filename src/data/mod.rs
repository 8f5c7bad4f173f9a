//! Data layer module
//!
//! In-memory caches and value models. Everything here is volatile
//! and rebuilt on demand:
//! - Account directory (TTL caches)
//! - Per-account post stores (time-windowed)
//! - Store registry (LRU-bounded)

mod directory;
mod models;
mod registry;
mod store;

pub use directory::AccountDirectory;
pub use models::{Account, Media, Post};
pub use registry::StoreRegistry;
pub use store::TimeWindowedPostStore;
