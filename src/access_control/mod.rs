//! Access control module
//!
//! Permission checks for guarded routes.
//!
//! ## Access Control Model
//!
//! Each user carries an ACL: a list of entries, each holding `METHOD PATH`
//! actions. Routes declare required permissions in the same format, and a
//! user passes when at least one requirement is granted.
//!
//! Paths support two placeholders:
//! - `*` matches any remaining characters, across segments
//! - `:name` matches exactly one non-empty segment
//!
//! A method of `*` grants every method, and `* *` grants everything.
//!
//! ## Example
//!
//! ```
//! use grid::access_control::{AccessControlEntry, is_authorized};
//!
//! let acl = vec![AccessControlEntry::new(["GET /tasks-service/*", "POST /users/:id"])];
//!
//! assert!(is_authorized(&acl, &["GET /tasks-service/alpha/beta"]));
//! assert!(is_authorized(&acl, &["POST /users/42"]));
//! assert!(!is_authorized(&acl, &["POST /users/42/roles"]));
//! ```

pub mod patterns;
pub mod resolver;
pub mod types;

pub use patterns::PathPattern;
pub use resolver::{AccessDecision, AclIndex, authorize, is_authorized};
pub use types::{AccessControlEntry, Permission, Role, WILDCARD};
