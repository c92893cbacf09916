//! Moderation actions and the privilege each one requires.

use serde::{Deserialize, Serialize};

use crate::session::Role;

/// Privileged command issued from the moderation panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ModerationAction {
    /// Broadcast an announcement to everyone.
    Announce { text: String },
    /// Force a user offline.
    Kick { target: String },
    /// Promote a user to admin.
    GrantAdmin { target: String },
    /// Demote an admin back to user.
    RevokeAdmin { target: String },
    /// Soft-delete every message in a room.
    ClearChat { room: String },
}

impl ModerationAction {
    /// Minimum role allowed to run this action.
    #[must_use]
    pub const fn required_role(&self) -> Role {
        match self {
            Self::Announce { .. } | Self::Kick { .. } | Self::ClearChat { .. } => Role::Admin,
            Self::GrantAdmin { .. } | Self::RevokeAdmin { .. } => Role::Owner,
        }
    }

    /// Returns the action name for logging.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Announce { .. } => "announce",
            Self::Kick { .. } => "kick",
            Self::GrantAdmin { .. } => "grant_admin",
            Self::RevokeAdmin { .. } => "revoke_admin",
            Self::ClearChat { .. } => "clear_chat",
        }
    }

    /// Username this action is aimed at, for user-targeted actions.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Kick { target } | Self::GrantAdmin { target } | Self::RevokeAdmin { target } => {
                Some(target)
            }
            Self::Announce { .. } | Self::ClearChat { .. } => None,
        }
    }

    /// Same action with surrounding whitespace stripped from every field.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Announce { text } => Self::Announce {
                text: text.trim().to_string(),
            },
            Self::Kick { target } => Self::Kick {
                target: target.trim().to_string(),
            },
            Self::GrantAdmin { target } => Self::GrantAdmin {
                target: target.trim().to_string(),
            },
            Self::RevokeAdmin { target } => Self::RevokeAdmin {
                target: target.trim().to_string(),
            },
            Self::ClearChat { room } => Self::ClearChat {
                room: room.trim().to_string(),
            },
        }
    }
}
