//! Metrics exposition
//!
//! Serves the process-wide registry in the Prometheus text format.

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;
use crate::metrics::REGISTRY;

/// GET /metrics
///
/// Encoding only fails on a malformed metric family, which would be a
/// bug in our instrument definitions; surface it as an internal error.
async fn serve_metrics() -> Result<Response, AppError> {
    let encoder = TextEncoder::new();
    let body = encoder
        .encode_to_string(&REGISTRY.gather())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("metrics encoding failed: {e}")))?;

    Ok(([(CONTENT_TYPE, encoder.format_type().to_string())], body).into_response())
}

/// Routes for metrics exposition
///
/// Stateless, so it merges cleanly after the feed routes have taken
/// the application state.
pub fn metrics_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(serve_metrics))
}
