//! E2E tests for the feed endpoints

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use birdfeed::data::Account;
use birdfeed::upstream::{PostsPage, RawPost};
use chrono::{Duration, Utc};
use common::{FakeUpstream, TestServer};

fn tester() -> Account {
    Account {
        id: 7,
        handle: "tester".to_string(),
        display_name: "Tester".to_string(),
    }
}

fn page_of(ids: &[u64]) -> PostsPage {
    let now = Utc::now();
    PostsPage {
        posts: ids
            .iter()
            .enumerate()
            .map(|(i, &id)| RawPost {
                id,
                text: format!("post {id}"),
                created_at: now - Duration::seconds(10 * (i as i64 + 1)),
                author_id: 7,
                media_keys: Vec::new(),
            })
            .collect(),
        included_accounts: HashMap::from([(7, tester())]),
        included_media: HashMap::new(),
        next_cursor: None,
    }
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new(Arc::new(FakeUpstream::default())).await;

    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_feed_by_id_returns_rss() {
    let upstream = Arc::new(FakeUpstream::new(
        vec![tester()],
        vec![page_of(&[103, 102, 101])],
    ));
    let server = TestServer::new(upstream).await;

    let response = server
        .client
        .get(server.url("/userid/7"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(
        response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/rss+xml")
    );

    let body = response.text().await.unwrap();
    assert!(body.contains("<title>Tester / @tester</title>"));
    // Items are oldest-first in the document.
    let oldest = body.find("post 101").unwrap();
    let newest = body.find("post 103").unwrap();
    assert!(oldest < newest);
}

#[tokio::test]
async fn test_handle_route_redirects_to_id_route() {
    let upstream = Arc::new(FakeUpstream::new(vec![tester()], Vec::new()));
    let server = TestServer::new(upstream).await;

    let response = server
        .client
        .get(server.url("/user/tester"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 307);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "/userid/7"
    );
}

#[tokio::test]
async fn test_unknown_account_returns_404() {
    let server = TestServer::new(Arc::new(FakeUpstream::default())).await;

    let response = server
        .client
        .get(server.url("/userid/999"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_account_lookup_is_cached_across_requests() {
    let upstream = Arc::new(FakeUpstream::new(vec![tester()], vec![page_of(&[103])]));
    let server = TestServer::new(upstream.clone()).await;

    // Redirect warms both caches; the feed request hits the by-id
    // cache without a second upstream lookup.
    server
        .client
        .get(server.url("/user/tester"))
        .send()
        .await
        .unwrap();
    server
        .client
        .get(server.url("/userid/7"))
        .send()
        .await
        .unwrap();

    assert_eq!(upstream.lookup_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_sync_uses_newest_cached_id() {
    let upstream = Arc::new(FakeUpstream::new(
        vec![tester()],
        vec![page_of(&[103, 102, 101])],
    ));
    let server = TestServer::new(upstream.clone()).await;

    server
        .client
        .get(server.url("/userid/7"))
        .send()
        .await
        .unwrap();
    server
        .client
        .get(server.url("/userid/7"))
        .send()
        .await
        .unwrap();

    let since_ids = upstream.seen_since_ids.lock().unwrap().clone();
    assert_eq!(since_ids, vec![None, Some(103)]);
}

#[tokio::test]
async fn test_404_for_unknown_routes() {
    let server = TestServer::new(Arc::new(FakeUpstream::default())).await;

    let response = server
        .client
        .get(server.url("/unknown/route"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_metrics_endpoint_is_exposed() {
    let server = TestServer::new(Arc::new(FakeUpstream::default())).await;

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(
        response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
}
