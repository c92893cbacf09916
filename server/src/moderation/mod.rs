//! Moderation
//!
//! Role-gated admin and owner actions: announcements, kicks, granting and
//! revoking admin, clearing a room.

mod action;
mod executor;
pub mod notice;
pub mod policy;
mod types;

pub use action::ModerationAction;
pub use executor::ModerationExecutor;
pub use types::{Denial, ModerationReceipt, PolicyError, MAX_ANNOUNCEMENT_CHARS};
