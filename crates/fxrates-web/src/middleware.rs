//! The ordered gates in front of every handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use fxrates_core::CachedResponse;

use crate::state::AppState;

/// Outermost gate: all-or-nothing quota admission keyed by the client address.
///
/// Rejections answer 429 with a `Retry-After` hint before any validation,
/// cache lookup, or warehouse access happens.
pub async fn rate_limit_gate(
    State(state): State<Arc<AppState>>,
    matched: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    // Unmatched paths fall through to the 404 without costing quota.
    let Some(matched) = matched else {
        return next.run(request).await;
    };
    let client = client_key(&request);

    match state.gate.check(&client, matched.as_str()) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            let retry_after = wait.as_secs().max(1);
            tracing::warn!(%client, route = matched.as_str(), retry_after, "rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.to_string())],
                Json(json!({ "cause": "Rate limit exceeded. Try again later." })),
            )
                .into_response()
        }
    }
}

/// Inner gate: replay a live cached response, or run the handler and store
/// whatever it produced, error statuses included.
///
/// The key is the literal request path, so two spellings of the same date are
/// distinct entries. Sitting inside the rate gate, a hit still costs quota.
pub async fn cache_gate(
    State(state): State<Arc<AppState>>,
    matched: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    if matched.is_none() {
        return next.run(request).await;
    }
    let key = request.uri().path().to_owned();

    if let Some(hit) = state.cache.get(&key).await {
        return replay(hit);
    }

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!(%error, "failed to buffer response body for caching");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // Repository faults propagate uncached; replaying one would pin the
    // outage for the full TTL after the repository recovers.
    if !parts.status.is_server_error() {
        state
            .cache
            .put(
                key,
                CachedResponse {
                    status: parts.status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                },
            )
            .await;
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn replay(hit: CachedResponse) -> Response {
    let status = StatusCode::from_u16(hit.status).unwrap_or(StatusCode::OK);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        hit.body,
    )
        .into_response()
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}
