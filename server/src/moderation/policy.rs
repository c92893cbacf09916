//! Local authorization and input checks.
//!
//! Everything here is pure: no I/O, no clock. The executor runs these checks
//! before it issues any remote call.

use super::action::ModerationAction;
use super::types::{Denial, PolicyError, MAX_ANNOUNCEMENT_CHARS};
use crate::rooms;
use crate::session::{Role, Session};

/// Run every check that needs no remote data.
///
/// Order: role rank, self-targeting, then field validation. The action is
/// expected to be [`ModerationAction::normalized`] already.
pub fn authorize(action: &ModerationAction, session: &Session) -> Result<(), PolicyError> {
    check_rank(action, session.role)?;
    check_self_target(action, session)?;
    validate_fields(action)
}

/// Fail unless `role` ranks at least as high as the action requires.
pub fn check_rank(action: &ModerationAction, role: Role) -> Result<(), PolicyError> {
    let required = action.required_role();
    if role.satisfies(required) {
        Ok(())
    } else {
        Err(PolicyError::InsufficientPrivilege(Denial::RankTooLow {
            action: action.action_name(),
            required,
            actual: role,
        }))
    }
}

/// Fail when a user-targeted action names the acting user.
pub fn check_self_target(action: &ModerationAction, session: &Session) -> Result<(), PolicyError> {
    match action.target() {
        Some(target) if session.is_self(target) => Err(PolicyError::SelfTargetNotAllowed {
            action: action.action_name(),
        }),
        _ => Ok(()),
    }
}

/// Required fields must be non-empty; announcements are capped at
/// [`MAX_ANNOUNCEMENT_CHARS`] characters.
pub fn validate_fields(action: &ModerationAction) -> Result<(), PolicyError> {
    match action {
        ModerationAction::Announce { text } => {
            if text.is_empty() {
                return Err(PolicyError::Validation(
                    "Please enter an announcement message.".to_string(),
                ));
            }
            if text.chars().count() > MAX_ANNOUNCEMENT_CHARS {
                return Err(PolicyError::Validation(format!(
                    "Announcement too long (max {MAX_ANNOUNCEMENT_CHARS} characters)."
                )));
            }
            Ok(())
        }
        ModerationAction::Kick { target }
        | ModerationAction::GrantAdmin { target }
        | ModerationAction::RevokeAdmin { target } => {
            if target.is_empty() {
                Err(PolicyError::Validation(
                    "Please enter a username.".to_string(),
                ))
            } else {
                Ok(())
            }
        }
        ModerationAction::ClearChat { room } => {
            if room.is_empty() {
                Err(PolicyError::Validation("Please choose a room.".to_string()))
            } else {
                Ok(())
            }
        }
    }
}

/// Whether the executor must look up the target's role before acting.
///
/// Only an admin's kick depends on who the target is; owners may kick anyone.
#[must_use]
pub fn needs_target_lookup(action: &ModerationAction, role: Role) -> bool {
    matches!(action, ModerationAction::Kick { .. }) && role == Role::Admin
}

/// Relative-privilege rule for an admin's kick.
pub fn check_kick_target(target_role: Role) -> Result<(), PolicyError> {
    match target_role {
        Role::Owner => Err(PolicyError::InsufficientPrivilege(Denial::TargetIsOwner)),
        Role::Admin => Err(PolicyError::InsufficientPrivilege(Denial::TargetIsAdmin)),
        Role::User => Ok(()),
    }
}

/// Posting into the staff room takes admin rank.
pub fn check_room_access(room: &str, role: Role) -> Result<(), PolicyError> {
    if room == rooms::ADMIN && !role.satisfies(Role::Admin) {
        return Err(PolicyError::InsufficientPrivilege(Denial::StaffRoom));
    }
    Ok(())
}
