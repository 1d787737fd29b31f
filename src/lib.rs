//! Declarative REST endpoint compiler and router.
//!
//! A JSON manifest declares endpoints (method, path pattern, typed inputs and
//! outputs, required roles). The manifest is compiled once at startup,
//! checked for pattern collisions, and indexed for dispatch.
//!
//! ```text
//! manifest JSON → endpoint::compile → routing::runtime_check → routing::build_index
//!                                                                   │
//! request → http::server → Index::find → scope::Auth → handler → declared outputs
//! ```

pub mod config;
pub mod endpoint;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod scope;
pub mod validator;

pub use config::schema::ServerConfig;
pub use endpoint::{compile, load_manifest, Endpoint, Method};
pub use http::{HandlerRegistry, HttpServer, RequestContext};
pub use lifecycle::Shutdown;
pub use routing::{build_index, runtime_check, Index};
pub use scope::{evaluate_scope, Scope};
pub use validator::{Validator, ValidatorRegistry};
