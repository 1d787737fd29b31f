//! Request-scoped context.
//!
//! Built fresh for every matched request and passed by reference from
//! matching through authorization to the handler; nothing about a request
//! is kept in shared state.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::scope::Auth;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub endpoint: Arc<Endpoint>,
    /// Percent-decoded request path fragments.
    pub fragments: Vec<String>,
    /// Typed input values keyed by rename: captures, query and form parameters.
    pub params: HashMap<String, Value>,
    pub auth: Auth,
}

impl RequestContext {
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Deserialize the parameter `name` into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.params
            .get(name)
            .and_then(|value| T::deserialize(value).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::compile;

    #[test]
    fn test_typed_access() {
        let endpoint = compile(br#"[{"method": "GET", "path": "/"}]"#)
            .unwrap()
            .remove(0);
        let mut params = HashMap::new();
        params.insert("ID".to_string(), Value::from(42u64));
        params.insert("Name".to_string(), Value::from("ada"));

        let ctx = RequestContext {
            request_id: "req-1".into(),
            endpoint: Arc::new(endpoint),
            fragments: Vec::new(),
            params,
            auth: Auth::default(),
        };

        assert_eq!(ctx.get::<u64>("ID"), Some(42));
        assert_eq!(ctx.get::<String>("Name").as_deref(), Some("ada"));
        assert_eq!(ctx.get::<u64>("Name"), None);
        assert!(ctx.param("missing").is_none());
    }
}
