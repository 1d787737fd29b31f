//! Parameter type validators.
//!
//! # Data Flow
//! ```text
//! manifest "type" string ("?string(1,30)")
//!     → TypeSpec::parse (optional marker, validator name, params)
//!     → ValidatorRegistry::resolve(name, params)
//!     → Extractor: raw value → typed value, or reject
//! ```
//!
//! # Design Decisions
//! - Validators are pure and stateless
//! - Compiled endpoints store the validator name and params, never the extractor
//! - `Validator::validate` returning `None` is a configuration signal,
//!   surfaced once at startup by the runtime check

pub mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Turns an untyped raw value into a typed one, or rejects it.
pub type Extractor = Box<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// A named parameter type.
///
/// `validate` receives the parenthesized parameters of the type string
/// (`["1", "30"]` for `string(1,30)`) and returns an extractor, or `None`
/// when the parameters are not acceptable for this type.
pub trait Validator: Send + Sync {
    fn validate(&self, params: &[String]) -> Option<Extractor>;
}

impl<F> Validator for F
where
    F: Fn(&[String]) -> Option<Extractor> + Send + Sync,
{
    fn validate(&self, params: &[String]) -> Option<Extractor> {
        self(params)
    }
}

/// Errors raised while parsing a type string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeSpecError {
    #[error("empty type")]
    Empty,

    #[error("invalid validator name `{0}`")]
    InvalidName(String),

    #[error("unbalanced parentheses")]
    Unbalanced,
}

/// Parsed form of a manifest `"type"` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub optional: bool,
    pub name: String,
    pub params: Vec<String>,
}

impl TypeSpec {
    /// Parse `?name(p1,p2)`; both the `?` marker and the parameter list are optional.
    pub fn parse(raw: &str) -> Result<Self, TypeSpecError> {
        let trimmed = raw.trim();
        let (optional, body) = match trimmed.strip_prefix('?') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        if body.is_empty() {
            return Err(TypeSpecError::Empty);
        }

        let (name, params) = match body.find('(') {
            Some(open) => {
                let inner = body[open + 1..]
                    .strip_suffix(')')
                    .ok_or(TypeSpecError::Unbalanced)?;
                if inner.contains(['(', ')']) {
                    return Err(TypeSpecError::Unbalanced);
                }
                let params = if inner.trim().is_empty() {
                    Vec::new()
                } else {
                    inner.split(',').map(|p| p.trim().to_string()).collect()
                };
                (body[..open].trim_end(), params)
            }
            None if body.contains(')') => return Err(TypeSpecError::Unbalanced),
            None => (body, Vec::new()),
        };

        let valid_name = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(TypeSpecError::InvalidName(name.to_string()));
        }

        Ok(Self {
            optional,
            name: name.to_string(),
            params,
        })
    }
}

/// Validators available to the runtime check and the request matcher, by name.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn Validator>>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_builtins(&mut registry);
        registry
    }

    /// Register (or replace) a validator under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        validator: impl Validator + 'static,
    ) -> &mut Self {
        self.validators.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Look up `name` and build its extractor for `params`.
    pub fn resolve(&self, name: &str, params: &[String]) -> Option<Extractor> {
        self.validators.get(name)?.validate(params)
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}
