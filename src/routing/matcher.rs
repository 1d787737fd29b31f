//! Per-request fragment matching.
//!
//! # Responsibilities
//! - Compare request fragments against one endpoint's pattern
//! - Run capture validators and collect typed values by rename
//! - Scan a bucket in declaration order, first match wins
//!
//! # Design Decisions
//! - Literal fragments need exact equality (case-sensitive)
//! - A missing validator or a rejected value makes the endpoint a non-match,
//!   never a panic
//! - Bucket members are pairwise disjoint (see `collision`), so the first
//!   match is the only match

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::endpoint::{Endpoint, Fragment};
use crate::validator::ValidatorRegistry;

/// Typed capture values keyed by capture rename.
pub type CaptureMap = HashMap<String, Value>;

/// Match `fragments` against `endpoint`, returning its captured values.
pub fn match_endpoint<S: AsRef<str>>(
    endpoint: &Endpoint,
    fragments: &[S],
    validators: &ValidatorRegistry,
) -> Option<CaptureMap> {
    if fragments.len() != endpoint.fragments.len() {
        return None;
    }

    let mut captures = CaptureMap::with_capacity(endpoint.captures.len());
    for (expected, raw) in endpoint.fragments.iter().zip(fragments) {
        let raw = raw.as_ref();
        match expected {
            Fragment::Literal(literal) => {
                if literal != raw {
                    return None;
                }
            }
            Fragment::Capture(index) => {
                let param = &endpoint.captures.get(*index)?.param;
                let extract = validators.resolve(&param.validator, &param.validator_params)?;
                let value = extract(&Value::String(raw.to_string()))?;
                captures.insert(param.rename.clone(), value);
            }
        }
    }
    Some(captures)
}

/// First endpoint of `bucket` matching `fragments`.
pub fn first_match<'a, S: AsRef<str>>(
    bucket: &'a [Arc<Endpoint>],
    fragments: &[S],
    validators: &ValidatorRegistry,
) -> Option<(&'a Arc<Endpoint>, CaptureMap)> {
    bucket.iter().find_map(|endpoint| {
        match_endpoint(endpoint, fragments, validators).map(|captures| (endpoint, captures))
    })
}
