//! Permission scopes.
//!
//! # Data Flow
//! ```text
//! Compile time:
//!     manifest "scope" ([["admin"], ["user[ID]"]])
//!     → normalise ([[]] becomes [])
//!     → RoleTemplate per role string, ScopeVar per capture reference
//!
//! Request time:
//!     Scope + captured values
//!     → Scope::resolve (substitute only at ScopeVar positions)
//!     → Auth { required, active } → granted?
//! ```
//!
//! # Design Decisions
//! - A scope is an OR of AND-groups; exact string membership, no wildcards
//! - Capture references are located once at compile time, never rescanned

pub mod auth;
pub mod template;

pub use auth::{evaluate_scope, Auth};
pub use template::{RoleTemplate, TemplatePart};

use crate::routing::CaptureMap;

/// Position of a capture reference inside a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeVar {
    /// Rename of the referenced capture.
    pub capture: String,
    pub group: usize,
    pub item: usize,
}

/// Compiled scope of an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    groups: Vec<Vec<RoleTemplate>>,
    vars: Vec<ScopeVar>,
}

impl Scope {
    /// Compile raw role groups; `captures` lists the renames of the endpoint's captures.
    pub fn compile(raw: &[Vec<String>], captures: &[&str]) -> Self {
        if matches!(raw, [group] if group.is_empty()) {
            return Self::default();
        }

        let mut vars = Vec::new();
        let groups = raw
            .iter()
            .enumerate()
            .map(|(group, roles)| {
                roles
                    .iter()
                    .enumerate()
                    .map(|(item, role)| {
                        let template = RoleTemplate::compile(role, |token| captures.contains(&token));
                        vars.extend(template.captures().map(|capture| ScopeVar {
                            capture: capture.to_string(),
                            group,
                            item,
                        }));
                        template
                    })
                    .collect()
            })
            .collect();

        Self { groups, vars }
    }

    /// True when the scope requires nothing.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[Vec<RoleTemplate>] {
        &self.groups
    }

    pub fn vars(&self) -> &[ScopeVar] {
        &self.vars
    }

    /// Concrete role groups for one request.
    pub fn resolve(&self, captures: &CaptureMap) -> Vec<Vec<String>> {
        let mut required: Vec<Vec<String>> = self
            .groups
            .iter()
            .map(|group| group.iter().map(|role| role.raw().to_string()).collect())
            .collect();

        for var in &self.vars {
            required[var.group][var.item] = self.groups[var.group][var.item].render(captures);
        }
        required
    }
}
