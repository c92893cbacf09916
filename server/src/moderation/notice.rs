//! Chat-visible notices derived from moderation actions.

use super::action::ModerationAction;
use crate::gateway::MessageRecord;
use crate::session::Session;

/// Sender name on system notices.
pub const SYSTEM_SENDER: &str = "System";

/// Sender name on announcement notices.
pub const ANNOUNCEMENT_SENDER: &str = "System Announcement";

/// Build the message posted after `action` succeeds.
#[must_use]
pub fn derived_notice(action: &ModerationAction, session: &Session, room: &str) -> MessageRecord {
    let (sender, text) = match action {
        ModerationAction::Announce { text } => {
            (ANNOUNCEMENT_SENDER, format!("📢 **ANNOUNCEMENT**: {text}"))
        }
        ModerationAction::Kick { target } => (
            SYSTEM_SENDER,
            system_text(&format!("{target} has been kicked from the chat.")),
        ),
        ModerationAction::GrantAdmin { target } => (
            SYSTEM_SENDER,
            system_text(&format!("{target} has been granted admin privileges!")),
        ),
        ModerationAction::RevokeAdmin { target } => (
            SYSTEM_SENDER,
            system_text(&format!("{target}'s admin privileges have been revoked.")),
        ),
        ModerationAction::ClearChat { .. } => (
            SYSTEM_SENDER,
            system_text(&format!(
                "Chat has been cleared by {}.",
                session.display_name
            )),
        ),
    };

    MessageRecord::new(session.user_id, sender, room, text)
}

fn system_text(body: &str) -> String {
    format!("⚙️ **SYSTEM**: {body}")
}
