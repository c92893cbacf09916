//! Command Dispatcher
//!
//! Maps user commands onto the moderation executor and the upload
//! gatekeeper, and renders the outcome through a [`NotificationSink`].

mod feedback;

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::gateway::NotificationSink;
use crate::moderation::{policy, ModerationAction, ModerationExecutor, PolicyError};
use crate::rooms;
use crate::session::Session;
use crate::uploads::{UploadCandidate, UploadError, UploadGatekeeper};

pub use feedback::{FeedbackCollector, Notice, NoticeLevel};

/// A user command.
#[derive(Debug)]
pub enum Command {
    Moderate(ModerationAction),
    Upload {
        candidate: UploadCandidate,
        room: String,
    },
}

/// Errors returned by [`CommandDispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl DispatchError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Policy(e) => e.code(),
            Self::Upload(e) => e.code(),
        }
    }
}

/// Routes commands and reports their outcome to the user.
#[derive(Clone)]
pub struct CommandDispatcher {
    executor: ModerationExecutor,
    uploads: Option<Arc<UploadGatekeeper>>,
}

impl CommandDispatcher {
    /// `uploads` is `None` when no object store is configured.
    #[must_use]
    pub const fn new(executor: ModerationExecutor, uploads: Option<Arc<UploadGatekeeper>>) -> Self {
        Self { executor, uploads }
    }

    #[must_use]
    pub fn uploads(&self) -> Option<&UploadGatekeeper> {
        self.uploads.as_deref()
    }

    /// Run `command` for `session`, then report the outcome to `sink`.
    pub async fn dispatch(
        &self,
        command: Command,
        session: &Session,
        sink: &dyn NotificationSink,
    ) -> Result<(), DispatchError> {
        match command {
            Command::Moderate(action) => self.moderate(action, session, sink).await,
            Command::Upload { candidate, room } => {
                self.upload(candidate, &room, session, sink).await
            }
        }
    }

    async fn moderate(
        &self,
        action: ModerationAction,
        session: &Session,
        sink: &dyn NotificationSink,
    ) -> Result<(), DispatchError> {
        let success = success_message(&action);
        let failure = failure_message(&action);

        match self.executor.execute(action, session).await {
            Ok(receipt) => {
                sink.show_success(&success);
                if receipt.is_degraded() {
                    sink.show_warning(DEGRADED_NOTICE);
                }
                Ok(())
            }
            Err(e) => {
                match &e {
                    PolicyError::TargetNotFound { .. } | PolicyError::RemoteFailure(_) => {
                        warn!(error = %e, "Moderation action failed");
                        sink.show_error(failure);
                    }
                    _ => sink.show_error(&e.to_string()),
                }
                Err(e.into())
            }
        }
    }

    async fn upload(
        &self,
        candidate: UploadCandidate,
        room: &str,
        session: &Session,
        sink: &dyn NotificationSink,
    ) -> Result<(), DispatchError> {
        let Some(gatekeeper) = &self.uploads else {
            let e = UploadError::NotConfigured;
            sink.show_error(&upload_failure_message(&e));
            return Err(e.into());
        };

        let room = match room.trim() {
            "" => rooms::PUBLIC,
            room => room,
        };

        if let Err(e) = policy::check_room_access(room, session.role) {
            sink.show_error(&e.to_string());
            return Err(e.into());
        }

        match gatekeeper.submit(candidate, session, room).await {
            Ok(_) => {
                sink.show_success("Image uploaded.");
                Ok(())
            }
            Err(e) => {
                sink.show_error(&upload_failure_message(&e));
                Err(e.into())
            }
        }
    }
}

/// Shown after the success text when the chat notice could not be posted.
pub const DEGRADED_NOTICE: &str =
    "The action was applied, but the chat notification could not be posted.";

/// Success text for a moderation action.
#[must_use]
pub fn success_message(action: &ModerationAction) -> String {
    match action {
        ModerationAction::Announce { .. } => "Announcement sent successfully!".to_string(),
        ModerationAction::Kick { target } => {
            format!("User \"{}\" has been kicked.", target.trim())
        }
        ModerationAction::GrantAdmin { target } => {
            format!("User \"{}\" has been granted admin privileges.", target.trim())
        }
        ModerationAction::RevokeAdmin { target } => {
            format!("Admin privileges revoked from \"{}\".", target.trim())
        }
        ModerationAction::ClearChat { .. } => "Chat cleared successfully.".to_string(),
    }
}

/// Text shown when the backend rejects or fails a moderation action.
#[must_use]
pub const fn failure_message(action: &ModerationAction) -> &'static str {
    match action {
        ModerationAction::Announce { .. } => "Failed to send announcement.",
        ModerationAction::Kick { .. } => "Failed to kick user. They may not exist.",
        ModerationAction::GrantAdmin { .. } => "Failed to grant admin. User may not exist.",
        ModerationAction::RevokeAdmin { .. } => "Failed to revoke admin. User may not exist.",
        ModerationAction::ClearChat { .. } => "Failed to clear chat.",
    }
}

/// Text shown for a failed upload attempt.
#[must_use]
pub fn upload_failure_message(error: &UploadError) -> String {
    match error {
        UploadError::NotConfigured => "Image uploads are not available.".to_string(),
        UploadError::InProgress => "An upload is already in progress.".to_string(),
        UploadError::Rejected(e) => e.to_string(),
        UploadError::StoreWrite(_) | UploadError::UrlResolution(_) | UploadError::Compose(_) => {
            "Failed to upload image. Please try again.".to_string()
        }
    }
}
