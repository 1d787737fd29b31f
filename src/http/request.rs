//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Read the request body up to the configured limit
//! - Decode the query string and the request body into raw values
//! - Validate query and form inputs of the matched endpoint
//!
//! # Design Decisions
//! - A key repeated in a query string or form body becomes a list of strings
//! - JSON bodies must be objects; their values reach validators untouched
//! - Missing required parameters and rejected values are reported by rename

use std::collections::HashMap;

use axum::body::{Body, Bytes};
use axum::http::Request;
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::endpoint::{Endpoint, ParamKind};
use crate::http::response::ApiError;
use crate::validator::ValidatorRegistry;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Raw values by key, as decoded from a query string or body.
pub type RawParams = Map<String, Value>;

/// Decode `application/x-www-form-urlencoded` pairs.
pub fn decode_urlencoded(input: &[u8]) -> RawParams {
    let mut params = RawParams::new();
    for (key, value) in url::form_urlencoded::parse(input) {
        let value = Value::String(value.into_owned());
        match params.get_mut(key.as_ref()) {
            Some(Value::Array(list)) => list.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.into_owned(), value);
            }
        }
    }
    params
}

pub fn decode_query(query: Option<&str>) -> RawParams {
    query
        .map(|q| decode_urlencoded(q.as_bytes()))
        .unwrap_or_default()
}

/// Read `body`, failing with `PayloadTooLarge` past `limit` bytes.
///
/// Chunked bodies carry no length up front, so the limit is only hit here.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    axum::body::to_bytes(body, limit).await.map_err(|err| {
        let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
        while let Some(e) = source {
            if e.is::<LengthLimitError>() {
                return ApiError::PayloadTooLarge;
            }
            source = e.source();
        }
        ApiError::MalformedBody
    })
}

/// Decode a request body according to its content type.
///
/// An empty body decodes to no parameters whatever its content type.
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<RawParams, ApiError> {
    if body.is_empty() {
        return Ok(RawParams::new());
    }

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("application/json") => match serde_json::from_slice(body) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(ApiError::MalformedBody),
        },
        Some("application/x-www-form-urlencoded") => Ok(decode_urlencoded(body)),
        _ => Err(ApiError::UnsupportedMediaType),
    }
}

/// Validate the query and form inputs of `endpoint` into `params`, keyed by rename.
pub fn extract_inputs(
    endpoint: &Endpoint,
    query: &RawParams,
    form: &RawParams,
    validators: &ValidatorRegistry,
    params: &mut HashMap<String, Value>,
) -> Result<(), ApiError> {
    for param in endpoint.input.values() {
        let source = match param.kind {
            ParamKind::Uri => continue,
            ParamKind::Query => query,
            ParamKind::Form => form,
        };

        let Some(raw) = source.get(&param.name) else {
            if param.optional {
                continue;
            }
            return Err(ApiError::MissingParam(param.rename.clone()));
        };

        let extract = validators
            .resolve(&param.validator, &param.validator_params)
            .ok_or_else(|| ApiError::Failure(format!("no validator for `{}`", param.rename)))?;
        let value = extract(raw).ok_or_else(|| ApiError::InvalidParam(param.rename.clone()))?;
        params.insert(param.rename.clone(), value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::compile;

    #[test]
    fn test_request_ids_are_unique() {
        let request = Request::new(());
        let mut maker = UuidRequestId;
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }

    #[tokio::test]
    async fn test_read_body_limit() {
        let bytes = read_body(Body::from("name=ada"), 16).await.unwrap();
        assert_eq!(&bytes[..], b"name=ada");

        assert_eq!(
            read_body(Body::from(vec![b'a'; 24]), 16).await.unwrap_err(),
            ApiError::PayloadTooLarge
        );
    }

    #[test]
    fn test_decode_query() {
        let params = decode_query(Some("page=2&tag=a&tag=b&tag=c&q=hello%20world"));
        assert_eq!(params["page"], Value::from("2"));
        assert_eq!(params["tag"], serde_json::json!(["a", "b", "c"]));
        assert_eq!(params["q"], Value::from("hello world"));
        assert!(decode_query(None).is_empty());
    }

    #[test]
    fn test_decode_body() {
        let json = decode_body(Some("application/json; charset=utf-8"), br#"{"n": 3}"#).unwrap();
        assert_eq!(json["n"], Value::from(3));

        let form = decode_body(Some("application/x-www-form-urlencoded"), b"a=1&b=x").unwrap();
        assert_eq!(form["b"], Value::from("x"));

        assert!(decode_body(Some("text/plain"), b"").unwrap().is_empty());
        assert_eq!(decode_body(Some("application/json"), b"[1]"), Err(ApiError::MalformedBody));
        assert_eq!(decode_body(Some("application/json"), b"{"), Err(ApiError::MalformedBody));
        assert_eq!(decode_body(Some("text/plain"), b"hi"), Err(ApiError::UnsupportedMediaType));
        assert_eq!(decode_body(None, b"hi"), Err(ApiError::UnsupportedMediaType));
    }

    #[test]
    fn test_extract_inputs() {
        let endpoints = compile(
            br#"[{"method": "POST", "path": "/users/{id}",
                  "in": {"{id}": {"type": "uint", "name": "ID"},
                         "GET@notify": {"type": "?bool", "name": "Notify"},
                         "age": {"type": "uint", "name": "Age"},
                         "nick": {"type": "?string(1,8)"}}}]"#,
        )
        .unwrap();
        let endpoint = &endpoints[0];
        let validators = ValidatorRegistry::with_builtins();

        let query = decode_query(Some("notify=1"));
        let mut form = RawParams::new();
        form.insert("age".into(), Value::from(30));

        let mut params = HashMap::new();
        extract_inputs(endpoint, &query, &form, &validators, &mut params).unwrap();
        assert_eq!(params["Notify"], Value::Bool(true));
        assert_eq!(params["Age"], Value::from(30u64));
        assert!(!params.contains_key("nick"));
        assert!(!params.contains_key("ID"));

        let empty = RawParams::new();
        assert_eq!(
            extract_inputs(endpoint, &query, &empty, &validators, &mut HashMap::new()),
            Err(ApiError::MissingParam("Age".into()))
        );

        form.insert("nick".into(), Value::from("far-too-long"));
        assert_eq!(
            extract_inputs(endpoint, &query, &form, &validators, &mut HashMap::new()),
            Err(ApiError::InvalidParam("nick".into()))
        );
    }
}
