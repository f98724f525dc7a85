//! JWT issuing and verification
//!
//! Tokens are HS256-signed with the configured shared secret and carry the
//! full user payload (identity, roles, ACL) so guards never hit the database.

use crate::access_control::{AccessControlEntry, Role};
use crate::auth::user::User;
use crate::config::AuthConfig;
use crate::error::{AuthError, ConfigError};
use crate::util::SecretString;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub acl: Vec<AccessControlEntry>,
    /// Issued at (seconds since epoch)
    #[serde(default)]
    pub iat: u64,
    /// Expiry (seconds since epoch)
    pub exp: u64,
}

impl From<Claims> for User {
    fn from(claims: Claims) -> Self {
        User {
            id: claims.sub,
            email: claims.email,
            roles: claims.roles,
            acl: claims.acl,
        }
    }
}

/// Signing and verification keys derived from the shared secret
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl JwtKeys {
    pub fn new(secret: &SecretString, ttl_secs: u64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let secret = config
            .jwt_secret
            .as_ref()
            .filter(|s| !s.is_blank())
            .ok_or_else(|| ConfigError::Missing {
                field: "auth.jwt_secret".to_string(),
            })?;
        Ok(Self::new(secret, config.token_ttl_secs))
    }

    /// Sign a token for `user` valid from now for the configured lifetime
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, jsonwebtoken::get_current_timestamp())
    }

    /// Sign a token as if issued at `issued_at`
    pub fn issue_at(&self, user: &User, issued_at: u64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            acl: user.acl.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Check signature and expiry, returning the payload
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("algorithm", &"HS256")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new(&SecretString::new("unit-test-secret"), 3600)
    }

    fn user() -> User {
        User {
            id: "7".to_string(),
            email: "ada@example.com".to_string(),
            roles: vec![Role::Supervisor],
            acl: vec![AccessControlEntry::new(["GET /tasks-service/*"])],
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys();
        let token = keys.issue(&user()).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.roles, vec![Role::Supervisor]);
        assert_eq!(claims.exp, claims.iat + 3600);
        assert_eq!(User::from(claims), user());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys();
        let now = jsonwebtoken::get_current_timestamp();
        let token = keys.issue_at(&user(), now - 2 * 3600).unwrap();

        assert!(matches!(keys.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = keys().issue(&user()).unwrap();
        let other = JwtKeys::new(&SecretString::new("another-secret"), 3600);

        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            keys().verify("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_without_acl_decodes_to_empty_acl() {
        let payload = serde_json::json!({
            "sub": "9",
            "email": "no-acl@example.com",
            "exp": jsonwebtoken::get_current_timestamp() + 600,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        let claims = keys().verify(&token).unwrap();
        assert!(claims.acl.is_empty());
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn test_from_config_requires_secret() {
        let config = AuthConfig::default();
        assert!(matches!(
            JwtKeys::from_config(&config),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", keys());
        assert!(debug.contains("HS256"));
        assert!(!debug.contains("unit-test-secret"));
    }
}
