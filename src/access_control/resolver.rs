//! Access decision engine
//!
//! Decides whether a user's ACL grants at least one of the permissions a
//! route requires. A requirement is satisfied (in this order) by:
//! 1. a full wildcard grant (`* *`)
//! 2. an exact path grant whose methods include `*` or the required method
//! 3. any wildcard/parameter path grant that matches the whole required path
//!    and whose methods include `*` or the required method
//!
//! The lookup index, compiled path patterns included, is rebuilt for every
//! check; nothing is cached across checks.

use crate::access_control::patterns::PathPattern;
use crate::access_control::types::{AccessControlEntry, Permission, WILDCARD};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Result of access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access is allowed
    Allowed,
    /// Access is denied with a reason
    Denied(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// Methods granted on one ACL path, with the path compiled once
#[derive(Debug)]
struct Grant {
    pattern: PathPattern,
    methods: HashSet<String>,
}

/// Path pattern → allowed methods, built from a user's ACL
#[derive(Debug, Default)]
pub struct AclIndex {
    grants: HashMap<String, Grant>,
}

impl AclIndex {
    /// Index every action of every entry
    pub fn build(acl: &[AccessControlEntry]) -> Self {
        let mut methods_by_path: HashMap<&str, HashSet<String>> = HashMap::new();

        for entry in acl {
            for action in &entry.actions {
                let Permission { method, path } = Permission::parse(action);
                methods_by_path
                    .entry(path)
                    .or_default()
                    .insert(method.to_string());
            }
        }

        let grants = methods_by_path
            .into_iter()
            .map(|(path, methods)| {
                let grant = Grant {
                    pattern: PathPattern::compile(path),
                    methods,
                };
                (path.to_string(), grant)
            })
            .collect();

        Self { grants }
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Number of distinct path patterns
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Methods granted on exactly this path pattern
    pub fn methods(&self, path: &str) -> Option<&HashSet<String>> {
        self.grants.get(path).map(|g| &g.methods)
    }

    /// Check a single requirement such as `"GET /tasks-service/*"`
    pub fn permits(&self, required: &str) -> bool {
        let required = Permission::parse(required);

        if self
            .methods(WILDCARD)
            .is_some_and(|methods| methods.contains(WILDCARD))
        {
            trace!("Matched full wildcard grant");
            return true;
        }

        if self
            .methods(required.path)
            .is_some_and(|methods| allows_method(methods, required.method))
        {
            trace!(path = required.path, "Matched exact path grant");
            return true;
        }

        self.grants.values().any(|grant| {
            let matched = allows_method(&grant.methods, required.method)
                && grant.pattern.matches(required.path);
            if matched {
                trace!(
                    pattern = grant.pattern.as_str(),
                    path = required.path,
                    "Matched path pattern grant"
                );
            }
            matched
        })
    }
}

fn allows_method(methods: &HashSet<String>, method: &str) -> bool {
    methods.contains(WILDCARD) || methods.contains(method)
}

/// Decide whether `acl` satisfies at least one of `required`
///
/// No requirements means the route is unguarded; an empty ACL grants nothing.
pub fn authorize<S: AsRef<str>>(acl: &[AccessControlEntry], required: &[S]) -> AccessDecision {
    if required.is_empty() {
        return AccessDecision::Allowed;
    }

    if acl.is_empty() {
        return AccessDecision::Denied("user has no ACL entries".to_string());
    }

    let index = AclIndex::build(acl);

    if required.iter().any(|r| index.permits(r.as_ref())) {
        AccessDecision::Allowed
    } else {
        AccessDecision::Denied(format!(
            "none of the required permissions granted: {}",
            required
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}

/// Boolean form of [`authorize`]
pub fn is_authorized<S: AsRef<str>>(acl: &[AccessControlEntry], required: &[S]) -> bool {
    authorize(acl, required).is_allowed()
}
