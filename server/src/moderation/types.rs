//! Moderation Types

use std::fmt;

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::session::Role;

/// Longest accepted announcement, in characters.
pub const MAX_ANNOUNCEMENT_CHARS: usize = 500;

// ============================================================================
// Error Types
// ============================================================================

/// Why a privileged action was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The session's role ranks below what the action requires.
    RankTooLow {
        action: &'static str,
        required: Role,
        actual: Role,
    },
    /// An admin tried to kick the owner.
    TargetIsOwner,
    /// An admin tried to kick another admin.
    TargetIsAdmin,
    /// A regular user tried to post into the staff-only room.
    StaffRoom,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RankTooLow {
                action,
                required: Role::Owner,
                ..
            } => write!(f, "Only the owner can {}.", action_phrase(action)),
            Self::RankTooLow { action, .. } => {
                write!(f, "Admin privileges are required to {}.", action_phrase(action))
            }
            Self::TargetIsOwner => f.write_str("Admins cannot kick the owner."),
            Self::TargetIsAdmin => f.write_str("Admins cannot kick other admins."),
            Self::StaffRoom => f.write_str("Only admins can post in the admin room."),
        }
    }
}

fn action_phrase(action: &str) -> &'static str {
    match action {
        "announce" => "send announcements",
        "kick" => "kick users",
        "grant_admin" => "grant admin privileges",
        "revoke_admin" => "revoke admin privileges",
        "clear_chat" => "clear the chat",
        _ => "do that",
    }
}

fn self_target_message(action: &str) -> &'static str {
    match action {
        "kick" => "You cannot kick yourself.",
        "grant_admin" => "You are already the owner.",
        "revoke_admin" => "You cannot revoke admin from yourself (you are owner).",
        _ => "You cannot target yourself.",
    }
}

/// Errors returned by the moderation executor.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("{0}")]
    InsufficientPrivilege(Denial),

    #[error("{}", self_target_message(.action))]
    SelfTargetNotAllowed { action: &'static str },

    #[error("{0}")]
    Validation(String),

    #[error("User \"{username}\" not found")]
    TargetNotFound { username: String },

    #[error("Remote failure: {0}")]
    RemoteFailure(#[from] GatewayError),
}

impl PolicyError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InsufficientPrivilege(_) => "INSUFFICIENT_PRIVILEGE",
            Self::SelfTargetNotAllowed { .. } => "SELF_TARGET",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::TargetNotFound { .. } => "TARGET_NOT_FOUND",
            Self::RemoteFailure(_) => "REMOTE_FAILURE",
        }
    }

    /// Whether the error was decided locally, before any remote call.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InsufficientPrivilege(_) | Self::SelfTargetNotAllowed { .. } | Self::Validation(_)
        )
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Outcome of a successful moderation action.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ModerationReceipt {
    pub action: &'static str,
    /// Rows touched by the primary mutation.
    pub rows_affected: u64,
    /// Set when the chat notification could not be posted.
    pub warning: Option<String>,
}

impl ModerationReceipt {
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}
