//! Explicit handler binding.
//!
//! # Responsibilities
//! - Register one handler per declared endpoint, by method and pattern
//! - Check registrations once at startup against the compiled index
//!
//! # Design Decisions
//! - Handlers are registered, never discovered
//! - A handler for an undeclared endpoint, or a second handler for the same
//!   endpoint, is a startup error
//! - A handler registered with its output renames must produce exactly the
//!   endpoint's declared outputs; the sets are compared once, at bind time
//! - Declared endpoints without a handler answer `501 Not Implemented`

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::endpoint::{Endpoint, Method};
use crate::http::context::RequestContext;
use crate::http::response::ApiError;
use crate::routing::Index;

/// Output fields produced by a handler, keyed by rename.
pub type HandlerOutput = Map<String, Value>;
pub type HandlerResult = Result<HandlerOutput, ApiError>;

/// Business logic behind one endpoint.
pub trait Handler: Send + Sync {
    fn call(&self, ctx: &RequestContext) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&RequestContext) -> HandlerResult + Send + Sync,
{
    fn call(&self, ctx: &RequestContext) -> HandlerResult {
        self(ctx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("handler registered for undeclared endpoint {method} {pattern}")]
    UnknownEndpoint { method: Method, pattern: String },

    #[error("more than one handler registered for {method} {pattern}")]
    Duplicate { method: Method, pattern: String },

    #[error("handler for {method} {pattern} produces {produced:?}, endpoint declares {declared:?}")]
    OutputMismatch {
        method: Method,
        pattern: String,
        declared: Vec<String>,
        produced: Vec<String>,
    },
}

type HandlerKey = (Method, String);

struct Registration {
    key: HandlerKey,
    /// Output renames the handler produces, when declared.
    outputs: Option<BTreeSet<String>>,
    handler: Arc<dyn Handler>,
}

/// Handlers waiting to be bound to an index.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Registration>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for the endpoint declared as `method pattern`.
    pub fn register(
        &mut self,
        method: Method,
        pattern: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        self.handlers.push(Registration {
            key: (method, pattern.into()),
            outputs: None,
            handler: Arc::new(handler),
        });
        self
    }

    /// Register `handler` along with the output renames it produces.
    pub fn register_with_outputs<I, S>(
        &mut self,
        method: Method,
        pattern: impl Into<String>,
        outputs: I,
        handler: impl Handler + 'static,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handlers.push(Registration {
            key: (method, pattern.into()),
            outputs: Some(outputs.into_iter().map(Into::into).collect()),
            handler: Arc::new(handler),
        });
        self
    }

    /// Check every registration against `index`.
    pub fn bind(self, index: &Index) -> Result<BoundHandlers, BindError> {
        let mut bound: HashMap<HandlerKey, Arc<dyn Handler>> = HashMap::new();
        for registration in self.handlers {
            let (method, pattern) = registration.key;
            let Some(endpoint) = index.get(method, &pattern) else {
                return Err(BindError::UnknownEndpoint { method, pattern });
            };
            if let Some(produced) = registration.outputs {
                let declared: BTreeSet<String> =
                    endpoint.output.values().map(|p| p.rename.clone()).collect();
                if produced != declared {
                    return Err(BindError::OutputMismatch {
                        method,
                        pattern,
                        declared: declared.into_iter().collect(),
                        produced: produced.into_iter().collect(),
                    });
                }
            }
            if bound.contains_key(&(method, pattern.clone())) {
                return Err(BindError::Duplicate { method, pattern });
            }
            bound.insert((method, pattern), registration.handler);
        }

        let unbound = index
            .endpoints()
            .iter()
            .filter(|e| !bound.contains_key(&(e.method, e.pattern.clone())))
            .map(|e| e.to_string())
            .collect();

        Ok(BoundHandlers {
            handlers: bound,
            unbound,
        })
    }
}

/// Handlers checked against an index.
#[derive(Default)]
pub struct BoundHandlers {
    handlers: HashMap<HandlerKey, Arc<dyn Handler>>,
    unbound: Vec<String>,
}

impl BoundHandlers {
    pub fn get(&self, endpoint: &Endpoint) -> Option<&Arc<dyn Handler>> {
        self.handlers
            .get(&(endpoint.method, endpoint.pattern.clone()))
    }

    /// Declared endpoints without a handler, as `METHOD pattern`.
    pub fn unbound(&self) -> &[String] {
        &self.unbound
    }
}

impl fmt::Debug for BoundHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundHandlers")
            .field("bound", &self.handlers.len())
            .field("unbound", &self.unbound)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::compile;
    use crate::routing::build_index;

    fn index() -> Index {
        build_index(
            compile(
                br#"[
                    {"method": "GET", "path": "/users"},
                    {"method": "POST", "path": "/users",
                     "out": {"id": {"type": "uint", "name": "ID"}}}
                ]"#,
            )
            .unwrap(),
        )
    }

    fn ok(_: &RequestContext) -> HandlerResult {
        Ok(HandlerOutput::new())
    }

    #[test]
    fn test_bind_reports_unbound() {
        let mut registry = HandlerRegistry::new();
        registry.register(Method::Get, "/users", ok);
        let bound = registry.bind(&index()).unwrap();

        let index = index();
        assert!(bound.get(&index.endpoints()[0]).is_some());
        assert!(bound.get(&index.endpoints()[1]).is_none());
        assert_eq!(bound.unbound(), &["POST /users".to_string()]);
    }

    #[test]
    fn test_unknown_endpoint() {
        let mut registry = HandlerRegistry::new();
        registry.register(Method::Delete, "/users", ok);
        assert_eq!(
            registry.bind(&index()).unwrap_err(),
            BindError::UnknownEndpoint {
                method: Method::Delete,
                pattern: "/users".into(),
            }
        );
    }

    #[test]
    fn test_duplicate() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(Method::Get, "/users", ok)
            .register(Method::Get, "/users", ok);
        assert!(matches!(
            registry.bind(&index()),
            Err(BindError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_declared_outputs_checked_at_bind() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_with_outputs(Method::Get, "/users", Vec::<String>::new(), ok)
            .register_with_outputs(Method::Post, "/users", ["ID"], ok);
        let bound = registry.bind(&index()).unwrap();
        assert!(bound.unbound().is_empty());

        let mut registry = HandlerRegistry::new();
        registry.register_with_outputs(Method::Post, "/users", ["ID", "Name"], ok);
        assert_eq!(
            registry.bind(&index()).unwrap_err(),
            BindError::OutputMismatch {
                method: Method::Post,
                pattern: "/users".into(),
                declared: vec!["ID".into()],
                produced: vec!["ID".into(), "Name".into()],
            }
        );
    }
}
