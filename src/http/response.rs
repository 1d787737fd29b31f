//! Response handling.
//!
//! # Responsibilities
//! - Map per-request errors to HTTP status codes
//! - Render errors as `{"error": {"code": ..., "reason": ...}}`
//! - Keep exactly the declared output fields of a handler result
//!
//! # Design Decisions
//! - Per-request errors are values, never fatal to the process
//! - A declared output the handler did not produce is a server failure

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::endpoint::Endpoint;

/// Per-request error outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("unknown service")]
    UnknownService,

    #[error("permission denied")]
    Permission,

    #[error("missing parameter `{0}`")]
    MissingParam(String),

    #[error("invalid parameter `{0}`")]
    InvalidParam(String),

    #[error("malformed request body")]
    MalformedBody,

    #[error("unsupported media type")]
    UnsupportedMediaType,

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("not implemented")]
    NotImplemented,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal failure: {0}")]
    Failure(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownService | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Permission => StatusCode::FORBIDDEN,
            ApiError::MissingParam(_) | ApiError::InvalidParam(_) | ApiError::MalformedBody => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Failure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metrics label for this outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::UnknownService => "unknown_service",
            ApiError::Permission => "forbidden",
            ApiError::MissingParam(_)
            | ApiError::InvalidParam(_)
            | ApiError::MalformedBody
            | ApiError::UnsupportedMediaType
            | ApiError::PayloadTooLarge => "bad_request",
            ApiError::NotImplemented => "not_implemented",
            ApiError::NotFound(_) | ApiError::Conflict(_) | ApiError::Failure(_) => "error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "error": {
                "code": status.as_u16(),
                "reason": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Keep the declared outputs of `endpoint`, keyed by rename.
pub fn render_output(
    endpoint: &Endpoint,
    mut produced: Map<String, Value>,
) -> Result<Map<String, Value>, ApiError> {
    let mut body = Map::with_capacity(endpoint.output.len());
    for param in endpoint.output.values() {
        let value = produced
            .remove(&param.rename)
            .ok_or_else(|| ApiError::Failure(format!("missing output `{}`", param.rename)))?;
        body.insert(param.rename.clone(), value);
    }
    Ok(body)
}
