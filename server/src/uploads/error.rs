//! Upload error types.

use thiserror::Error;

use super::validation::UploadValidationError;
use crate::gateway::{ComposerError, StoreError};

/// Errors that can occur during an upload attempt.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Image uploads are not configured.
    #[error("Image uploads are not available")]
    NotConfigured,

    /// The candidate failed validation.
    #[error(transparent)]
    Rejected(#[from] UploadValidationError),

    /// Another attempt for the same session is still running.
    #[error("An upload is already in progress")]
    InProgress,

    /// Object store refused the write (including key collisions).
    #[error("Storage error: {0}")]
    StoreWrite(StoreError),

    /// Stored, but no public URL could be produced.
    #[error("Could not resolve public URL: {0}")]
    UrlResolution(String),

    /// Stored, but the chat message could not be posted.
    #[error("Failed to post image message: {0}")]
    Compose(#[from] ComposerError),
}

impl UploadError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "STORAGE_NOT_CONFIGURED",
            Self::Rejected(UploadValidationError::NoFile) => "NO_FILE",
            Self::Rejected(UploadValidationError::TooLarge { .. }) => "FILE_TOO_LARGE",
            Self::Rejected(
                UploadValidationError::InvalidType { .. }
                | UploadValidationError::ContentMismatch { .. },
            ) => "INVALID_MIME_TYPE",
            Self::InProgress => "UPLOAD_IN_PROGRESS",
            Self::StoreWrite(_) | Self::UrlResolution(_) => "STORAGE_ERROR",
            Self::Compose(_) => "REMOTE_FAILURE",
        }
    }
}
