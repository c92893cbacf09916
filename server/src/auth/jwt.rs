//! Session Token Validation
//!
//! Chat sessions are HS256 JWTs signed with the shared `JWT_SECRET`. The
//! claims carry everything the moderation core needs, so no user lookup
//! happens per request.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};
use crate::session::{Role, Session};

/// JWT claims for a chat session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string).
    pub sub: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Convert validated claims into the acting session.
    pub fn into_session(self) -> AuthResult<Session> {
        let user_id: Uuid = self.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(Session::new(user_id, self.username, self.display_name, self.role))
    }
}

/// Issue a session token. Used by tests and local tooling; production tokens
/// come from the identity provider sharing the secret.
pub fn issue_session_token(
    session: &Session,
    secret: &str,
    expiry_seconds: i64,
) -> AuthResult<String> {
    let claims = Claims {
        sub: session.user_id.to_string(),
        username: session.username.clone(),
        display_name: session.display_name.clone(),
        role: session.role,
        exp: (Utc::now() + Duration::seconds(expiry_seconds)).timestamp(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Validate and decode a session token.
pub fn validate_session_token(token: &str, secret: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
