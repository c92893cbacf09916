//! Authentication Middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::session::Session;

use super::error::AuthError;
use super::jwt::validate_session_token;

/// Authenticated user injected into request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Session);

impl AuthUser {
    /// The acting session for this request.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.0
    }
}

/// Middleware to require authentication.
///
/// Extracts the Bearer token from the Authorization header, validates it and
/// injects `AuthUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let session = validate_session_token(token, &state.config.jwt_secret)?.into_session()?;

    tracing::debug!(user_id = %session.user_id, role = %session.role, "Session authenticated");

    request.extensions_mut().insert(AuthUser(session));

    Ok(next.run(request).await)
}

/// Extractor for the authenticated user in handlers behind [`require_auth`].
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
