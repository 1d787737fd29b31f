//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject empty credentials and roles
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid listener bind address `{0}`")]
    InvalidBindAddress(String),

    #[error("manifest path is empty")]
    EmptyManifestPath,

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("maximum body size must be greater than zero")]
    ZeroBodyLimit,

    #[error("empty api key")]
    EmptyApiKey,

    #[error("empty role assigned to an api key")]
    EmptyRole,

    #[error("invalid metrics address `{0}`")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.manifest.path.trim().is_empty() {
        errors.push(ValidationError::EmptyManifestPath);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.auth.api_keys.keys().any(|key| key.is_empty()) {
        errors.push(ValidationError::EmptyApiKey);
    }
    if config
        .auth
        .api_keys
        .values()
        .flatten()
        .any(|role| role.is_empty())
    {
        errors.push(ValidationError::EmptyRole);
    }

    let metrics = &config.observability;
    if metrics.metrics_enabled && metrics.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            metrics.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.manifest.path = " ".into();
        config.timeouts.request_secs = 0;
        config.security.max_body_size = 0;
        config.auth.api_keys.insert(String::new(), vec![String::new()]);
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "bad".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBindAddress("nowhere".into()),
                ValidationError::EmptyManifestPath,
                ValidationError::ZeroTimeout,
                ValidationError::ZeroBodyLimit,
                ValidationError::EmptyApiKey,
                ValidationError::EmptyRole,
                ValidationError::InvalidMetricsAddress("bad".into()),
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());
    }
}
