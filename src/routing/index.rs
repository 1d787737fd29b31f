//! Dispatch index.
//!
//! # Design Decisions
//! - Key = method ordinal + 10 × fragment count; unknown methods get
//!   ordinal 0 and land in buckets no endpoint can occupy
//! - Buckets keep manifest declaration order
//! - Immutable after construction, shared freely across request tasks

use std::collections::HashMap;
use std::sync::Arc;

use crate::endpoint::{Endpoint, Method};
use crate::validator::ValidatorRegistry;

use super::matcher::{first_match, CaptureMap};

/// Bucket key for a request method and fragment count.
pub fn dispatch_key(method: &str, fragment_count: usize) -> usize {
    let ordinal = method.parse::<Method>().map(Method::ordinal).unwrap_or(0);
    ordinal + 10 * fragment_count
}

/// A matched endpoint and the typed values of its captures.
#[derive(Debug, Clone)]
pub struct Match {
    pub endpoint: Arc<Endpoint>,
    pub captures: CaptureMap,
}

/// Endpoints bucketed by method and fragment count.
#[derive(Debug, Clone, Default)]
pub struct Index {
    endpoints: Vec<Arc<Endpoint>>,
    buckets: HashMap<usize, Vec<Arc<Endpoint>>>,
}

impl Index {
    /// Build the index. `endpoints` should already have passed the runtime check.
    pub fn build(endpoints: Vec<Endpoint>) -> Self {
        let endpoints: Vec<Arc<Endpoint>> = endpoints.into_iter().map(Arc::new).collect();
        let mut buckets: HashMap<usize, Vec<Arc<Endpoint>>> = HashMap::new();
        for endpoint in &endpoints {
            buckets
                .entry(dispatch_key(endpoint.method.as_str(), endpoint.arity()))
                .or_default()
                .push(endpoint.clone());
        }
        Self { endpoints, buckets }
    }

    /// Endpoints sharing the bucket of `method` and `fragment_count`.
    pub fn bucket(&self, method: &str, fragment_count: usize) -> &[Arc<Endpoint>] {
        self.buckets
            .get(&dispatch_key(method, fragment_count))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Find the endpoint serving `method` and `fragments`.
    pub fn find<S: AsRef<str>>(
        &self,
        method: &str,
        fragments: &[S],
        validators: &ValidatorRegistry,
    ) -> Option<Match> {
        let bucket = self.bucket(method, fragments.len());
        first_match(bucket, fragments, validators).map(|(endpoint, captures)| Match {
            endpoint: endpoint.clone(),
            captures,
        })
    }

    /// Endpoint declared with exactly `method` and `pattern`.
    pub fn get(&self, method: Method, pattern: &str) -> Option<&Arc<Endpoint>> {
        self.endpoints
            .iter()
            .find(|e| e.method == method && e.pattern == pattern)
    }

    /// All endpoints, in declaration order.
    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Build the dispatch index for `endpoints`.
pub fn build_index(endpoints: Vec<Endpoint>) -> Index {
    Index::build(endpoints)
}
