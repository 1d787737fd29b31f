//! Request spans.
//!
//! Every request runs inside one span carrying its request ID, so log lines
//! from matching, authorization and handlers correlate.

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::X_REQUEST_ID;

/// Span factory for `TraceLayer`.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
