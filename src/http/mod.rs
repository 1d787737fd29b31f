//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID, query/body decoding, input validation)
//!     → roles.rs (caller's active roles)
//!     → handler.rs (bound business logic, fed a context.rs)
//!     → response.rs (declared outputs, error bodies)
//!     → Send to client
//! ```

pub mod context;
pub mod handler;
pub mod request;
pub mod response;
pub mod roles;
pub mod server;

pub use context::RequestContext;
pub use handler::{BindError, BoundHandlers, Handler, HandlerOutput, HandlerRegistry, HandlerResult};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{render_output, ApiError};
pub use roles::{ApiKeyRoles, RoleProvider};
pub use server::{AppState, HttpServer};
