//! Feed endpoints

use axum::{
    Router,
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

use crate::AppState;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

use super::rss;

/// GET /user/:handle
///
/// Resolves the handle and redirects to the canonical by-id route,
/// so feed readers end up subscribed to the stable account id.
async fn user_feed_by_handle(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Redirect, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/user/:handle"])
        .start_timer();

    let account = state.feed.resolve_handle(&handle).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/user/:handle", "307"])
        .inc();

    Ok(Redirect::temporary(&format!("/userid/{}", account.id)))
}

/// GET /userid/:id
///
/// Syncs the account's store and renders its current contents as RSS.
async fn user_feed_by_id(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/userid/:id"])
        .start_timer();

    let (account, posts) = state.feed.feed_by_id(id).await?;
    let body = rss::render_feed(&account, &posts);

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/userid/:id", "200"])
        .inc();

    Ok((
        [(CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        body,
    )
        .into_response())
}

/// Create feed router
pub fn feed_router() -> Router<AppState> {
    Router::new()
        .route("/user/:handle", get(user_feed_by_handle))
        .route("/userid/:id", get(user_feed_by_id))
}
