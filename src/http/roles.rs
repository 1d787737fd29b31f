//! Caller role resolution.

use std::collections::HashMap;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::config::AuthConfig;

/// Source of the active roles of a caller.
pub trait RoleProvider: Send + Sync {
    fn active_roles(&self, headers: &HeaderMap) -> Vec<String>;
}

/// Maps `Authorization: Bearer <key>` to the roles configured for that key.
/// Unknown or absent keys carry no roles.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyRoles {
    keys: HashMap<String, Vec<String>>,
}

impl ApiKeyRoles {
    pub fn new(keys: HashMap<String, Vec<String>>) -> Self {
        Self { keys }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.api_keys.clone())
    }
}

impl RoleProvider for ApiKeyRoles {
    fn active_roles(&self, headers: &HeaderMap) -> Vec<String> {
        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .and_then(|key| self.keys.get(key.trim()))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn provider() -> ApiKeyRoles {
        let mut keys = HashMap::new();
        keys.insert("k1".to_string(), vec!["admin".to_string()]);
        ApiKeyRoles::new(keys)
    }

    #[test]
    fn test_known_key() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer k1"));
        assert_eq!(provider().active_roles(&headers), vec!["admin".to_string()]);
    }

    #[test]
    fn test_unknown_or_missing_key() {
        let mut headers = HeaderMap::new();
        assert!(provider().active_roles(&headers).is_empty());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert!(provider().active_roles(&headers).is_empty());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic k1"));
        assert!(provider().active_roles(&headers).is_empty());
    }
}
