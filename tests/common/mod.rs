//! Common test utilities for E2E tests

use async_trait::async_trait;
use birdfeed::data::Account;
use birdfeed::error::AppError;
use birdfeed::upstream::{PostsPage, Upstream};
use birdfeed::{AppState, config};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted in-memory upstream
///
/// Serves a fixed set of accounts and a queue of post pages in order.
/// Once the queue is drained, every further fetch returns an empty
/// page. Records calls so tests can assert cache behavior.
#[derive(Default)]
pub struct FakeUpstream {
    accounts: Vec<Account>,
    pages: Mutex<VecDeque<PostsPage>>,
    pub lookup_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub seen_since_ids: Mutex<Vec<Option<u64>>>,
}

impl FakeUpstream {
    pub fn new(accounts: Vec<Account>, pages: Vec<PostsPage>) -> Self {
        Self {
            accounts,
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn lookup_account_by_id(&self, id: u64) -> Result<Account, AppError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.accounts
            .iter()
            .find(|account| account.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn lookup_account_by_handle(&self, handle: &str) -> Result<Account, AppError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.accounts
            .iter()
            .find(|account| account.handle.eq_ignore_ascii_case(handle))
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn fetch_posts_page<'a>(
        &self,
        _account_id: u64,
        since_id: Option<u64>,
        _cursor: Option<&'a str>,
        _not_older_than: DateTime<Utc>,
        _page_size: u32,
    ) -> Result<PostsPage, AppError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_since_ids.lock().unwrap().push(since_id);
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance backed by the given upstream
    pub async fn new(upstream: std::sync::Arc<FakeUpstream>) -> Self {
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            upstream: config::UpstreamConfig {
                bearer_token: "test-token".to_string(),
                base_url: "https://upstream.test.example.com".to_string(),
                page_size: 100,
                timeout_seconds: 5,
            },
            cache: config::CacheConfig {
                account_capacity: 100,
                account_ttl_seconds: 3600,
                store_capacity: 100,
                store_ttl_seconds: 3600,
            },
            logging: config::LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::with_upstream(config, upstream).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        let app = birdfeed::build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            addr,
            state,
            client,
        }
    }

    /// Build a full URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}
