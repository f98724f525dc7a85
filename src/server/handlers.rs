//! Route handlers
//!
//! Access checks happen in the guard before these run, so handlers only
//! shape responses.

use crate::auth::{AuthenticatedUser, User};
use crate::server::AppState;
use crate::storage;
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// `/health` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub db: String,
}

impl HealthResponse {
    fn connected() -> Self {
        Self {
            status: "ok".to_string(),
            db: "connected".to_string(),
        }
    }

    fn unreachable() -> Self {
        Self {
            status: "error".to_string(),
            db: "unreachable".to_string(),
        }
    }
}

/// Message body, with the caller attached where the route is authenticated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            user: None,
        }
    }

    fn with_user(message: &str, user: User) -> Self {
        Self {
            message: message.to_string(),
            user: Some(user),
        }
    }
}

/// Database reachability. Always 200; the body tells the state.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    match storage::ping(state.db.as_ref()).await {
        Ok(()) => Json(HealthResponse::connected()),
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            Json(HealthResponse::unreachable())
        }
    }
}

pub async fn public_endpoint() -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "This is public! you can access without a token",
    ))
}

pub async fn protected(AuthenticatedUser(user): AuthenticatedUser) -> Json<MessageResponse> {
    Json(MessageResponse::with_user("You have protected access!", user))
}

pub async fn admin_only(AuthenticatedUser(user): AuthenticatedUser) -> Json<MessageResponse> {
    Json(MessageResponse::with_user(
        "Only supervisors or super-role users can see this",
        user,
    ))
}

pub async fn tasks() -> Json<MessageResponse> {
    Json(MessageResponse::new("You have permission to view tasks"))
}
