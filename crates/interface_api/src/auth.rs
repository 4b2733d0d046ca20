//! Bearer token authentication and role checks
//!
//! Tokens are HS256 JWTs issued by `party-api`. Each route group requires
//! one role from [`permissions`]; [`permissions::ADMIN`] satisfies all of them.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

/// Issuer written to and required in every token
pub const TOKEN_ISSUER: &str = "party-api";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub roles: Vec<String>,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Returns true if the caller holds the role or is an administrator
    pub fn has_role(&self, role: &str) -> bool {
        self.roles
            .iter()
            .any(|r| r == role || r == permissions::ADMIN)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
            AuthError::MissingPermission(role) => {
                ApiError::Forbidden(format!("The '{}' role is required", role))
            }
        }
    }
}

/// Issues a token for the user with the given roles
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let issued = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        iss: TOKEN_ISSUER.to_string(),
        exp: (issued + Duration::seconds(expiration_secs as i64)).timestamp(),
        iat: issued.timestamp(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| AuthError::InvalidToken)
}

/// Verifies the signature, expiry and issuer of a token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[TOKEN_ISSUER]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
}

/// Fails with `MissingPermission` unless the caller holds the role
pub fn require_role(claims: &Claims, role: &str) -> Result<(), AuthError> {
    if claims.has_role(role) {
        Ok(())
    } else {
        Err(AuthError::MissingPermission(role.to_string()))
    }
}

/// Roles checked by the handlers
pub mod permissions {
    pub const ADMIN: &str = "admin";
    pub const PARTY_READ: &str = "party:read";
    pub const PARTY_WRITE: &str = "party:write";
    pub const REFERENCE_READ: &str = "party-reference:read";
    pub const REFERENCE_ADMIN: &str = "party-reference:admin";
}
