//! Access control types
//!
//! Core types shared by the decision engine and the request guards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token that matches any method, or any path when used as a whole path.
pub const WILDCARD: &str = "*";

/// One grant in a user's access-control list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlEntry {
    /// Actions of the form `"<METHOD> <PATH>"`, or a bare path
    #[serde(default)]
    pub actions: Vec<String>,
}

impl AccessControlEntry {
    /// Create an entry from a list of action strings
    pub fn new<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }
}

/// A `METHOD PATH` pair split out of an action or a requirement string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission<'a> {
    pub method: &'a str,
    pub path: &'a str,
}

impl<'a> Permission<'a> {
    /// Split on the first space.
    ///
    /// A string with no method token is a grant on that literal path for any
    /// method, never a full wildcard.
    pub fn parse(action: &'a str) -> Self {
        match action.split_once(' ') {
            Some((method, path)) => Self { method, path },
            None => Self {
                method: WILDCARD,
                path: action,
            },
        }
    }
}

/// User role carried in the identity token
///
/// Unknown role names are preserved in [`Role::Other`] so a token issued with
/// a newer role set still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Supervisor,
    SuperRole,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Supervisor => "supervisor",
            Role::SuperRole => "super-role",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" => Role::User,
            "supervisor" => Role::Supervisor,
            "super-role" => Role::SuperRole,
            _ => Role::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
