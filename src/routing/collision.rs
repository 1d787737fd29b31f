//! Static collision checking.
//!
//! # Responsibilities
//! - Resolve every parameter's validator against the registry
//! - Prove that no two endpoints of the same method and fragment count can
//!   match the same request
//!
//! # Algorithm
//! Fragments of a same-shape pair are compared position by position:
//! - literal vs literal: different strings prove the pair disjoint
//! - capture vs capture: treated as overlapping (validators are black boxes)
//! - literal vs capture: overlapping iff the capture's validator accepts the literal
//!
//! A pair with no disjoint position is a collision. The check is sound but
//! incomplete: two captures with mutually exclusive validators still collide.

use thiserror::Error;

use serde_json::Value;

use crate::endpoint::{Endpoint, Fragment};
use crate::validator::ValidatorRegistry;

/// Errors raised by the runtime check. Both are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("{endpoint} [{param}]: unknown or misconfigured type `{type_name}`")]
    UnknownValidator {
        endpoint: String,
        param: String,
        type_name: String,
    },

    #[error("pattern collision between {first} and {second}")]
    PatternCollision { first: String, second: String },
}

/// Result type for the runtime check.
pub type CheckResult<T> = Result<T, CheckError>;

/// Check validators and collisions over the whole endpoint set.
pub fn runtime_check(endpoints: &[Endpoint], validators: &ValidatorRegistry) -> CheckResult<()> {
    for endpoint in endpoints {
        for (key, param) in endpoint.parameters() {
            if validators
                .resolve(&param.validator, &param.validator_params)
                .is_none()
            {
                return Err(CheckError::UnknownValidator {
                    endpoint: endpoint.to_string(),
                    param: key.clone(),
                    type_name: param.type_name.clone(),
                });
            }
        }
    }

    for (i, first) in endpoints.iter().enumerate() {
        for second in &endpoints[i + 1..] {
            if collide(first, second, validators)? {
                return Err(CheckError::PatternCollision {
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Whether `a` and `b` may both match some request. Symmetric.
pub fn collide(a: &Endpoint, b: &Endpoint, validators: &ValidatorRegistry) -> CheckResult<bool> {
    if a.method != b.method || a.arity() != b.arity() {
        return Ok(false);
    }

    for (position, (fa, fb)) in a.fragments.iter().zip(&b.fragments).enumerate() {
        let disjoint = match (fa, fb) {
            (Fragment::Literal(x), Fragment::Literal(y)) => x != y,
            (Fragment::Capture(_), Fragment::Capture(_)) => false,
            (Fragment::Literal(literal), Fragment::Capture(_)) => {
                !accepts(b, position, literal, validators)?
            }
            (Fragment::Capture(_), Fragment::Literal(literal)) => {
                !accepts(a, position, literal, validators)?
            }
        };
        if disjoint {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether the capture of `endpoint` at `position` accepts `literal`.
fn accepts(
    endpoint: &Endpoint,
    position: usize,
    literal: &str,
    validators: &ValidatorRegistry,
) -> CheckResult<bool> {
    let unknown = |param: String, type_name: String| CheckError::UnknownValidator {
        endpoint: endpoint.to_string(),
        param,
        type_name,
    };

    let capture = endpoint
        .capture_at(position)
        .ok_or_else(|| unknown(format!("#{position}"), String::new()))?;
    let param = &capture.param;
    let extract = validators
        .resolve(&param.validator, &param.validator_params)
        .ok_or_else(|| unknown(format!("{{{}}}", param.name), param.type_name.clone()))?;

    Ok(extract(&Value::String(literal.to_string())).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::compile;

    fn endpoints(json: &str) -> Vec<Endpoint> {
        compile(json.as_bytes()).unwrap()
    }

    fn check(json: &str) -> CheckResult<()> {
        runtime_check(&endpoints(json), &ValidatorRegistry::with_builtins())
    }

    fn pair_collides(json: &str) -> bool {
        let eps = endpoints(json);
        let validators = ValidatorRegistry::with_builtins();
        let forward = collide(&eps[0], &eps[1], &validators).unwrap();
        let backward = collide(&eps[1], &eps[0], &validators).unwrap();
        assert_eq!(forward, backward, "collision must be symmetric");
        forward
    }

    #[test]
    fn test_capture_accepting_literal_collides() {
        let err = check(
            r#"[
                {"method": "GET", "path": "/users/{id}",
                 "in": {"{id}": {"type": "uint", "name": "ID"}}},
                {"method": "GET", "path": "/users/123"}
            ]"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CheckError::PatternCollision {
                first: "GET /users/{id}".into(),
                second: "GET /users/123".into(),
            }
        );
    }

    #[test]
    fn test_capture_rejecting_literal_is_disjoint() {
        assert!(check(
            r#"[
                {"method": "GET", "path": "/users/{id}",
                 "in": {"{id}": {"type": "uint", "name": "ID"}}},
                {"method": "GET", "path": "/users/abc"}
            ]"#,
        )
        .is_ok());
    }

    #[test]
    fn test_literal_pairs() {
        assert!(pair_collides(
            r#"[{"method": "GET", "path": "/a"}, {"method": "GET", "path": "/a"}]"#
        ));
        assert!(!pair_collides(
            r#"[{"method": "GET", "path": "/a"}, {"method": "GET", "path": "/b"}]"#
        ));
    }

    #[test]
    fn test_different_method_or_arity() {
        assert!(!pair_collides(
            r#"[{"method": "GET", "path": "/a"}, {"method": "POST", "path": "/a"}]"#
        ));
        assert!(!pair_collides(
            r#"[{"method": "GET", "path": "/a"}, {"method": "GET", "path": "/a/b"}]"#
        ));
    }

    #[test]
    fn test_capture_pairs_collide_conservatively() {
        assert!(pair_collides(
            r#"[
                {"method": "GET", "path": "/n/{a}", "in": {"{a}": {"type": "uint", "name": "A"}}},
                {"method": "GET", "path": "/n/{b}", "in": {"{b}": {"type": "bool", "name": "B"}}}
            ]"#
        ));
    }

    #[test]
    fn test_disjoint_literal_after_captures() {
        assert!(!pair_collides(
            r#"[
                {"method": "GET", "path": "/{a}/x", "in": {"{a}": {"type": "any", "name": "A"}}},
                {"method": "GET", "path": "/{b}/y", "in": {"{b}": {"type": "any", "name": "B"}}}
            ]"#
        ));
    }

    #[test]
    fn test_mixed_positions() {
        // /users/{id}/posts vs /users/me/{section}: "me" is not a uint.
        assert!(!pair_collides(
            r#"[
                {"method": "GET", "path": "/users/{id}/posts",
                 "in": {"{id}": {"type": "uint", "name": "ID"}}},
                {"method": "GET", "path": "/users/me/{section}",
                 "in": {"{section}": {"type": "string", "name": "Section"}}}
            ]"#
        ));
        // With a string capture, "me" and "posts" are both accepted.
        assert!(pair_collides(
            r#"[
                {"method": "GET", "path": "/users/{id}/posts",
                 "in": {"{id}": {"type": "string", "name": "ID"}}},
                {"method": "GET", "path": "/users/me/{section}",
                 "in": {"{section}": {"type": "string", "name": "Section"}}}
            ]"#
        ));
    }

    #[test]
    fn test_unknown_validator() {
        let err = check(
            r#"[{"method": "POST", "path": "/a", "in": {"x": {"type": "sku"}}}]"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CheckError::UnknownValidator {
                endpoint: "POST /a".into(),
                param: "x".into(),
                type_name: "sku".into(),
            }
        );

        assert!(matches!(
            check(r#"[{"method": "POST", "path": "/a", "out": {"x": {"type": "string(z)"}}}]"#),
            Err(CheckError::UnknownValidator { .. })
        ));
    }
}
