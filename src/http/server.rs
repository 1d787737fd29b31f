//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with one catch-all handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind the server to a listener with graceful shutdown
//! - Dispatch requests through the index, authorization and handlers
//!
//! # Data Flow
//! ```text
//! Request
//!     → split path into fragments, percent-decode each
//!     → index lookup (method + fragment count, first match)  → 404
//!     → scope substitution + active roles                    → 403
//!     → read body up to the limit                            → 413
//!     → query / body inputs through validators               → 400 / 415
//!     → bound handler                                        → 501
//!     → declared outputs only                                → 200 JSON
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, Request},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::context::RequestContext;
use crate::http::handler::BoundHandlers;
use crate::http::request::{
    decode_body, decode_query, extract_inputs, read_body, UuidRequestId, X_REQUEST_ID,
};
use crate::http::response::{render_output, ApiError};
use crate::http::roles::RoleProvider;
use crate::observability::{metrics, tracing::request_span};
use crate::routing::{decode_fragments, split_path, Index};
use crate::scope::Auth;
use crate::validator::ValidatorRegistry;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<Index>,
    pub validators: Arc<ValidatorRegistry>,
    pub handlers: Arc<BoundHandlers>,
    pub roles: Arc<dyn RoleProvider>,
    pub max_body_size: usize,
}

/// HTTP server for the compiled endpoints.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(
        config: ServerConfig,
        index: Index,
        validators: ValidatorRegistry,
        handlers: BoundHandlers,
        roles: impl RoleProvider + 'static,
    ) -> Self {
        let state = AppState {
            index: Arc::new(index),
            validators: Arc::new(validators),
            handlers: Arc::new(handlers),
            roles: Arc::new(roles),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The configured router, for serving on a custom listener.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Catch-all handler.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().as_str().to_string();

    let result = handle(&state, request).await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    metrics::record_request(&method, outcome, start);

    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(error = %e, "Request failed");
            } else {
                tracing::debug!(error = %e, "Request rejected");
            }
            e.into_response()
        }
    }
}

async fn handle(
    state: &AppState,
    request: Request<Body>,
) -> Result<serde_json::Map<String, serde_json::Value>, ApiError> {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (parts, body) = request.into_parts();
    let fragments =
        decode_fragments(&split_path(parts.uri.path())).ok_or(ApiError::UnknownService)?;

    let matched = state
        .index
        .find(parts.method.as_str(), &fragments, &state.validators)
        .ok_or(ApiError::UnknownService)?;
    let endpoint = matched.endpoint;
    tracing::debug!(
        request_id = %request_id,
        endpoint = %endpoint,
        "Endpoint matched"
    );

    let active = state.roles.active_roles(&parts.headers);
    let auth = Auth::for_scope(endpoint.scope(), &matched.captures, active);
    if !auth.granted() {
        tracing::info!(
            request_id = %request_id,
            endpoint = %endpoint,
            required = ?auth.required,
            "Permission denied"
        );
        return Err(ApiError::Permission);
    }

    let query = decode_query(parts.uri.query());
    let bytes = read_body(body, state.max_body_size).await?;
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let form = decode_body(content_type, &bytes)?;

    let mut params = matched.captures;
    extract_inputs(&endpoint, &query, &form, &state.validators, &mut params)?;

    let handler = state
        .handlers
        .get(&endpoint)
        .ok_or(ApiError::NotImplemented)?;

    let ctx = RequestContext {
        request_id,
        fragments,
        endpoint: endpoint.clone(),
        params,
        auth,
    };
    let produced = handler.call(&ctx)?;
    render_output(&endpoint, produced)
}
