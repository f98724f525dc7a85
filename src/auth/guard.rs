//! Request guards
//!
//! Every routed request passes through [`guard`], which looks up the route's
//! policy in the [`RouteTable`] and then runs, in order:
//! 1. bearer token authentication (skipped for public routes)
//! 2. role check (user must hold any required role)
//! 3. permission check (user's ACL must grant any required permission)
//!
//! The table is built once at startup. `HEAD` requests use the `GET` policy
//! of the same route, matching how axum dispatches them. Routes absent from
//! the table are refused.

use crate::access_control::{AccessDecision, Role, authorize};
use crate::auth::token::JwtKeys;
use crate::auth::user::{AuthenticatedUser, User};
use crate::error::{AccessDeniedError, AppError, AuthError};
use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderMap, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Access requirements of one route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Skip authentication entirely
    pub public: bool,
    /// Any one of these roles is required (empty: no role check)
    pub roles: Vec<Role>,
    /// Any one of these permissions is required (empty: no ACL check)
    pub permissions: Vec<String>,
}

impl RoutePolicy {
    pub fn public() -> Self {
        Self {
            public: true,
            ..Default::default()
        }
    }

    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn with_roles<I>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        self.roles.extend(roles);
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }
}

/// Route template → policy, keyed by method
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<(Method, String), RoutePolicy>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy for `method` on the route template `path`
    /// (as written in the router, e.g. `/users/{id}`)
    pub fn route(mut self, method: Method, path: impl Into<String>, policy: RoutePolicy) -> Self {
        self.routes.insert((method, path.into()), policy);
        self
    }

    /// Policy for `method` on `path`; `HEAD` falls back to `GET`
    pub fn get(&self, method: &Method, path: &str) -> Option<&RoutePolicy> {
        let lookup = |m: &Method| self.routes.get(&(m.clone(), path.to_string()));
        lookup(method).or_else(|| {
            if *method == Method::HEAD {
                lookup(&Method::GET)
            } else {
                None
            }
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// State handed to the guard middleware
#[derive(Debug, Clone)]
pub struct GuardState {
    pub keys: Arc<JwtKeys>,
    pub routes: Arc<RouteTable>,
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Verify the bearer token and decode the user it carries
pub fn authenticate(keys: &JwtKeys, headers: &HeaderMap) -> Result<User, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    keys.verify(token).map(User::from)
}

/// Guard middleware; install with `route_layer` so `MatchedPath` is set
pub async fn guard(
    State(state): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(route) = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
    else {
        return Ok(next.run(request).await);
    };

    let method = request.method().clone();
    let Some(policy) = state.routes.get(&method, &route) else {
        warn!(method = %method, route = %route, "No access policy for route");
        return Err(
            AccessDeniedError::new(method.as_str(), route, "route has no access policy").into(),
        );
    };

    if policy.public {
        return Ok(next.run(request).await);
    }

    let user = authenticate(&state.keys, request.headers()).inspect_err(|e| {
        debug!(method = %method, uri = %request.uri(), error = %e, "Authentication failed");
    })?;

    if !user.has_any_role(&policy.roles) {
        let required = policy
            .roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        warn!(
            user = %user.email,
            roles = %user.role_names(),
            method = %method,
            uri = %request.uri(),
            required = %required,
            "Role check failed"
        );
        return Err(AccessDeniedError::missing_role(method.as_str(), route, &required).into());
    }

    if let AccessDecision::Denied(reason) = authorize(&user.acl, &policy.permissions) {
        warn!(
            user = %user.email,
            roles = %user.role_names(),
            method = %method,
            uri = %request.uri(),
            required = %policy.permissions.join(", "),
            "Permission denied"
        );
        return Err(AccessDeniedError::new(method.as_str(), route, reason).into());
    }

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}
