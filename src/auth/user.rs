//! Authenticated principal

use crate::access_control::{AccessControlEntry, Role};
use crate::error::{AppError, AuthError};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

/// Verified user, decoded from the bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub acl: Vec<AccessControlEntry>,
}

impl User {
    /// True when no roles are required or the user holds any of them
    pub fn has_any_role(&self, required: &[Role]) -> bool {
        required.is_empty() || required.iter().any(|r| self.roles.contains(r))
    }

    /// Comma-separated role names, for diagnostics
    pub fn role_names(&self) -> String {
        self.roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Extractor for the user the guard placed into request extensions.
///
/// Returns 401 on routes the guard treats as public.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Auth(AuthError::MissingToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: Vec<Role>) -> User {
        User {
            id: "1".to_string(),
            email: "user@example.com".to_string(),
            roles,
            acl: Vec::new(),
        }
    }

    #[test]
    fn test_no_required_roles_passes() {
        assert!(user(vec![]).has_any_role(&[]));
    }

    #[test]
    fn test_any_shared_role_passes() {
        let u = user(vec![Role::User, Role::SuperRole]);
        assert!(u.has_any_role(&[Role::Supervisor, Role::SuperRole]));
    }

    #[test]
    fn test_no_shared_role_fails() {
        let u = user(vec![Role::User]);
        assert!(!u.has_any_role(&[Role::Supervisor, Role::SuperRole]));
    }

    #[test]
    fn test_role_names() {
        let u = user(vec![Role::User, Role::Other("auditor".into())]);
        assert_eq!(u.role_names(), "user, auditor");
    }
}
