//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and compile the endpoint manifest
//! - Run the runtime check against the validator registry
//! - Build the dispatch index
//!
//! # Design Decisions
//! - Fail fast: any manifest or check error is fatal
//! - The index is only built from endpoints that passed the check

use std::path::Path;

use thiserror::Error;

use crate::endpoint::{load_manifest, ManifestError};
use crate::observability::metrics;
use crate::routing::{build_index, runtime_check, CheckError, Index};
use crate::validator::ValidatorRegistry;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Check(#[from] CheckError),
}

/// Compile, check and index the manifest at `path`.
pub fn load_routes(path: &Path, validators: &ValidatorRegistry) -> Result<Index, StartupError> {
    let endpoints = load_manifest(path)?;
    tracing::info!(
        manifest = %path.display(),
        endpoints = endpoints.len(),
        "Manifest compiled"
    );

    runtime_check(&endpoints, validators)?;
    tracing::debug!("Runtime check passed");

    let index = build_index(endpoints);
    metrics::record_endpoints(index.len());
    Ok(index)
}
