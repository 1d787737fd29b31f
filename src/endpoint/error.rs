//! Compile-time error definitions.
//!
//! Every variant is fatal at load time: startup aborts on the first one.

use thiserror::Error;

use crate::validator::TypeSpecError;

/// What went wrong while compiling one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
    #[error("unknown method, expected GET, POST, PUT or DELETE")]
    UnknownMethod,

    #[error("invalid pattern: {0}")]
    InvalidPattern(&'static str),

    #[error("invalid capture fragment `{0}`")]
    InvalidCaptureName(String),

    #[error("capture `{0}` appears twice in the pattern")]
    DuplicateCapture(String),

    #[error("capture `{0}` has no matching input parameter")]
    UnspecifiedCapture(String),

    #[error("input refers to capture `{0}` which the pattern does not declare")]
    UnknownCapture(String),

    #[error("empty parameter name")]
    EmptyParamName,

    #[error("invalid type `{raw}`: {reason}")]
    InvalidParamType { raw: String, reason: TypeSpecError },

    #[error("uri and query parameters need an explicit rename")]
    MissingRename,

    #[error("uri parameters cannot be optional")]
    OptionalCapture,

    #[error("output parameters cannot be uri or query parameters")]
    IllegalOutputKind,

    #[error("output parameters cannot be optional")]
    OptionalOutput,

    #[error("name conflicts with parameter `{0}`")]
    ParamNameConflict(String),
}

/// A compile error attributed to its endpoint and, when relevant, parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {path}{}: {kind}", render_field(.field))]
pub struct CompileError {
    pub method: String,
    pub path: String,
    pub field: Option<String>,
    pub kind: CompileErrorKind,
}

fn render_field(field: &Option<String>) -> String {
    field
        .as_deref()
        .map(|f| format!(" [{f}]"))
        .unwrap_or_default()
}

impl CompileError {
    pub fn new(method: &str, path: &str, kind: CompileErrorKind) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            field: None,
            kind,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Errors raised while loading a whole manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Result type for manifest compilation.
pub type ManifestResult<T> = Result<T, ManifestError>;
