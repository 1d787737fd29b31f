//! Permission grant evaluation.

use super::Scope;
use crate::routing::CaptureMap;

/// Required roles of a matched endpoint against the caller's active roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auth {
    /// OR of AND-groups, captures already substituted.
    pub required: Vec<Vec<String>>,
    pub active: Vec<String>,
}

impl Auth {
    pub fn new(required: Vec<Vec<String>>, active: Vec<String>) -> Self {
        Self { required, active }
    }

    /// Resolve `scope` against the captured values of one request.
    pub fn for_scope(scope: &Scope, captures: &CaptureMap, active: Vec<String>) -> Self {
        Self::new(scope.resolve(captures), active)
    }

    /// Granted when nothing is required, or when every role of at least one
    /// group is active. An empty group is trivially satisfied.
    pub fn granted(&self) -> bool {
        self.required.is_empty()
            || self
                .required
                .iter()
                .any(|group| group.iter().all(|role| self.active.contains(role)))
    }
}

/// Substitute captured values into `scope` and check it against `active`.
pub fn evaluate_scope(scope: &Scope, captures: &CaptureMap, active: &[String]) -> bool {
    Auth::for_scope(scope, captures, active.to_vec()).granted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn granted(required: &[&[&str]], active: &[&str]) -> bool {
        Auth::new(required.iter().map(|g| strings(g)).collect(), strings(active)).granted()
    }

    #[test]
    fn test_empty_requirement() {
        assert!(granted(&[], &[]));
        assert!(granted(&[], &["anything"]));
        assert!(granted(&[&[]], &[]));
    }

    #[test]
    fn test_or_of_and() {
        let required: &[&[&str]] = &[&["A", "B"], &["C"]];
        assert!(granted(required, &["C"]));
        assert!(!granted(required, &["A"]));
        assert!(granted(required, &["A", "B"]));
        assert!(!granted(required, &[]));
        assert!(!granted(required, &["a", "b", "c"]));
    }

    #[test]
    fn test_evaluate_with_substitution() {
        let scope = Scope::compile(&[strings(&["user[ID]"])], &["ID"]);
        let mut captures = CaptureMap::new();
        captures.insert("ID".into(), Value::from(42u64));

        assert!(evaluate_scope(&scope, &captures, &strings(&["user[42]"])));
        assert!(!evaluate_scope(&scope, &captures, &strings(&["user[43]"])));
        assert!(!evaluate_scope(&scope, &captures, &strings(&["user[ID]"])));
    }
}
