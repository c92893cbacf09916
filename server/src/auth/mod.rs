//! Authentication
//!
//! Resolves the acting session from a Bearer token.

mod error;
pub mod jwt;
mod middleware;

pub use error::{AuthError, AuthResult, ErrorResponse};
pub use jwt::{issue_session_token, validate_session_token, Claims};
pub use middleware::{require_auth, AuthUser};
