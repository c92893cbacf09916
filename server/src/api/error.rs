//! API Error Types

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::dispatch::{DispatchError, Notice, NoticeLevel};

/// Errors returned by command handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The dispatcher refused or failed the command.
    #[error("{error}")]
    Command {
        error: DispatchError,
        notices: Vec<Notice>,
    },

    /// The multipart body could not be read.
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    pub notices: Vec<Notice>,
}

/// HTTP status for a dispatcher error code.
#[must_use]
pub fn status_for(code: &str) -> StatusCode {
    match code {
        "VALIDATION_ERROR" | "NO_FILE" => StatusCode::BAD_REQUEST,
        "INSUFFICIENT_PRIVILEGE" => StatusCode::FORBIDDEN,
        "TARGET_NOT_FOUND" => StatusCode::NOT_FOUND,
        "UPLOAD_IN_PROGRESS" => StatusCode::CONFLICT,
        "FILE_TOO_LARGE" => StatusCode::PAYLOAD_TOO_LARGE,
        "INVALID_MIME_TYPE" => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        "SELF_TARGET" => StatusCode::UNPROCESSABLE_ENTITY,
        "REMOTE_FAILURE" | "STORAGE_ERROR" => StatusCode::BAD_GATEWAY,
        "STORAGE_NOT_CONFIGURED" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Command { error, notices } => {
                // The user-facing notice never leaks backend detail
                let message = notices
                    .iter()
                    .rev()
                    .find(|n| n.level == NoticeLevel::Error)
                    .map_or_else(|| error.to_string(), |n| n.message.clone());
                (
                    status_for(error.code()),
                    ErrorBody {
                        error: error.code().to_string(),
                        message,
                        notices,
                    },
                )
            }
            Self::Multipart(e) => (
                e.status(),
                ErrorBody {
                    error: "INVALID_MULTIPART".to_string(),
                    message: e.body_text(),
                    notices: Vec::new(),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::PolicyError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for("SELF_TARGET"), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for("UPLOAD_IN_PROGRESS"), StatusCode::CONFLICT);
        assert_eq!(status_for("FILE_TOO_LARGE"), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(status_for("STORAGE_NOT_CONFIGURED"), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for("SOMETHING_ELSE"), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_message_prefers_error_notice() {
        let response = ApiError::Command {
            error: DispatchError::Policy(PolicyError::TargetNotFound {
                username: "ghost".into(),
            }),
            notices: vec![Notice {
                level: NoticeLevel::Error,
                message: "Failed to kick user. They may not exist.".into(),
            }],
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
