//! Birdfeed - an RSS bridge over a rate-limited upstream API
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - RSS feed endpoints                                       │
//! │  - Metrics endpoint                                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Feed orchestration                                       │
//! │  - Incremental sync engine                                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - Account directory (TTL caches)                           │
//! │  - Post stores (time-windowed, LRU-bounded registry)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! All state is in-memory and rebuilt on demand; restarting the
//! process costs one full resync per account on next access.
//!
//! # Modules
//!
//! - `api`: HTTP handlers and RSS rendering
//! - `service`: Business logic layer
//! - `sync`: Incremental fetch-until-caught-up engine
//! - `data`: Caches and value models
//! - `upstream`: Upstream API client contract and implementation
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod sync;
pub mod upstream;

use std::num::NonZeroUsize;
use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains the shared
/// caches behind the feed service.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Feed service (directory + registry + sync engine)
    pub feed: Arc<service::FeedService>,
}

impl AppState {
    /// Initialize application state with the real upstream client
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        let upstream = Arc::new(upstream::TwitterApi::new(&config.upstream)?);
        Self::with_upstream(config, upstream)
    }

    /// Initialize application state with a caller-provided upstream
    ///
    /// Used by integration tests to substitute a fake client.
    pub fn with_upstream(
        config: config::AppConfig,
        upstream: Arc<dyn upstream::Upstream>,
    ) -> Result<Self, error::AppError> {
        let directory = Arc::new(data::AccountDirectory::new(
            upstream.clone(),
            config.cache.account_capacity,
            std::time::Duration::from_secs(config.cache.account_ttl_seconds),
        ));

        let store_capacity = NonZeroUsize::new(config.cache.store_capacity).ok_or_else(|| {
            error::AppError::Config("cache.store_capacity must be greater than 0".to_string())
        })?;
        let registry = Arc::new(data::StoreRegistry::new(
            store_capacity,
            chrono::Duration::seconds(config.cache.store_ttl_seconds as i64),
        ));

        let engine = Arc::new(sync::IncrementalSyncEngine::new(
            upstream,
            config.upstream.page_size,
        ));

        let feed = Arc::new(service::FeedService::new(directory, registry, engine));

        tracing::info!(
            account_capacity = config.cache.account_capacity,
            store_capacity = config.cache.store_capacity,
            store_ttl_seconds = config.cache.store_ttl_seconds,
            "Application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            feed,
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::feed_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
