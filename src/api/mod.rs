//! API layer
//!
//! HTTP handlers for:
//! - RSS feed endpoints
//! - Metrics (Prometheus)

mod feed;
mod metrics;
mod rss;

pub use feed::feed_router;
pub use metrics::metrics_router;
