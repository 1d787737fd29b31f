//! Endpoint compilation.
//!
//! # Data Flow
//! ```text
//! manifest bytes (JSON array)
//!     → manifest.rs (serde model)
//!     → pattern.rs (fragments + captures)
//!     → parameter.rs (classify keys, types, renames, conflicts)
//!     → scope (role templates + capture references)
//!     → Vec<Endpoint> (immutable)
//! ```
//!
//! # Design Decisions
//! - Fail fast: the first structural error aborts the whole manifest
//! - Errors carry the endpoint's method and path, plus the parameter key
//! - Endpoints hold validator names only; resolution happens against a
//!   registry at check time and at request time

pub mod error;
pub mod manifest;
pub mod parameter;
pub mod pattern;

pub use error::{CompileError, CompileErrorKind, ManifestError, ManifestResult};
pub use manifest::{ManifestEndpoint, ManifestParam};
pub use parameter::{ParamKind, Parameter};
pub use pattern::Fragment;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scope::Scope;
use parameter::find_conflict;
use pattern::parse_pattern;

/// HTTP methods an endpoint may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Get, Method::Post, Method::Put, Method::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Small distinct integer used by the dispatch index; 0 is reserved for
    /// methods no endpoint can declare.
    pub fn ordinal(self) -> usize {
        match self {
            Method::Get => 1,
            Method::Post => 2,
            Method::Put => 3,
            Method::Delete => 4,
        }
    }
}

impl FromStr for Method {
    type Err = CompileErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or(CompileErrorKind::UnknownMethod)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capture of the pattern, tied to its URI parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
    pub fragment_index: usize,
    pub param: Parameter,
}

/// A compiled endpoint. Never mutated after compilation.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: Method,
    pub pattern: String,
    pub info: String,
    pub fragments: Vec<Fragment>,
    pub captures: Vec<Capture>,
    /// Raw manifest key → parameter.
    pub input: BTreeMap<String, Parameter>,
    pub output: BTreeMap<String, Parameter>,
    pub scope: Scope,
}

impl Endpoint {
    /// Compile one manifest entry.
    pub fn compile(raw: &ManifestEndpoint) -> Result<Self, CompileError> {
        let fail = |kind| CompileError::new(&raw.method, &raw.path, kind);

        let method: Method = raw.method.parse().map_err(fail)?;
        let parsed = parse_pattern(&raw.path).map_err(fail)?;

        let mut input = BTreeMap::new();
        for (key, param) in &raw.input {
            let param = Parameter::input(key, param).map_err(|kind| fail(kind).with_field(key))?;
            if param.kind == ParamKind::Uri
                && !parsed.captures.iter().any(|(name, _)| *name == param.name)
            {
                return Err(fail(CompileErrorKind::UnknownCapture(param.name)).with_field(key));
            }
            input.insert(key.clone(), param);
        }

        let mut captures = Vec::with_capacity(parsed.captures.len());
        for (name, fragment_index) in parsed.captures {
            let param = input
                .values()
                .find(|p| p.kind == ParamKind::Uri && p.name == name)
                .cloned()
                .ok_or_else(|| fail(CompileErrorKind::UnspecifiedCapture(name.clone())))?;
            captures.push(Capture {
                name,
                fragment_index,
                param,
            });
        }

        let mut output = BTreeMap::new();
        for (key, param) in &raw.output {
            let param = Parameter::output(key, param).map_err(|kind| fail(kind).with_field(key))?;
            output.insert(key.clone(), param);
        }

        for params in [&input, &output] {
            if let Some((key, other)) = find_conflict(params) {
                return Err(
                    fail(CompileErrorKind::ParamNameConflict(other.to_string())).with_field(key),
                );
            }
        }

        let renames: Vec<&str> = captures.iter().map(|c| c.param.rename.as_str()).collect();
        let scope = Scope::compile(&raw.scope, &renames);

        Ok(Self {
            method,
            pattern: raw.path.clone(),
            info: raw.info.clone(),
            fragments: parsed.fragments,
            captures,
            input,
            output,
            scope,
        })
    }

    /// Number of path fragments.
    pub fn arity(&self) -> usize {
        self.fragments.len()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Parameter bound to the capture at `fragment`, if that fragment is a capture.
    pub fn capture_at(&self, fragment: usize) -> Option<&Capture> {
        match self.fragments.get(fragment)? {
            Fragment::Capture(index) => self.captures.get(*index),
            Fragment::Literal(_) => None,
        }
    }

    /// Every input and output parameter, with its raw key.
    pub fn parameters(&self) -> impl Iterator<Item = (&String, &Parameter)> {
        self.input.iter().chain(self.output.iter())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

/// Compile a whole manifest, stopping at the first error.
pub fn compile(bytes: &[u8]) -> ManifestResult<Vec<Endpoint>> {
    let raw: Vec<ManifestEndpoint> = serde_json::from_slice(bytes)?;
    let endpoints = raw
        .iter()
        .map(Endpoint::compile)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(endpoints)
}

/// Read and compile a manifest file.
pub fn load_manifest(path: &Path) -> ManifestResult<Vec<Endpoint>> {
    let bytes = std::fs::read(path)?;
    compile(&bytes)
}
