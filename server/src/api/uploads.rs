//! Image Upload Handler

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::debug;

use super::{run_command, ApiError, AppState, CommandResponse};
use crate::auth::AuthUser;
use crate::dispatch::{upload_failure_message, Command, Notice, NoticeLevel};
use crate::rooms;
use crate::uploads::{verify_content, UploadCandidate, UploadError};

/// POST /api/uploads
///
/// Multipart fields: `file` (required) and `room` (defaults to the public
/// room).
#[tracing::instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.session().user_id))]
pub async fn upload_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<CommandResponse>, ApiError> {
    let mut file_data: Vec<u8> = Vec::new();
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut room: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                filename = field.file_name().map(String::from);
                content_type = field.content_type().map(String::from);
                file_data = field.bytes().await?.to_vec();
            }
            "room" => room = Some(field.text().await?),
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let filename = filename.unwrap_or_default();

    // Fall back to the extension when the part carries no content type
    let content_type = content_type
        .or_else(|| {
            mime_guess::from_path(&filename)
                .first()
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    debug!(filename = %filename, content_type = %content_type, size = file_data.len(), "Upload received");

    // Magic-byte check for types the policy would otherwise accept
    if let Some(gatekeeper) = state.dispatcher.uploads() {
        if !file_data.is_empty() && gatekeeper.policy().allows_type(&content_type) {
            if let Err(e) = verify_content(&file_data, &content_type) {
                let error = UploadError::Rejected(e);
                let notices = vec![Notice {
                    level: NoticeLevel::Error,
                    message: upload_failure_message(&error),
                }];
                return Err(ApiError::Command {
                    error: error.into(),
                    notices,
                });
            }
        }
    }

    let command = Command::Upload {
        candidate: UploadCandidate::new(filename, content_type, file_data),
        room: room.unwrap_or_else(|| rooms::PUBLIC.to_string()),
    };

    run_command(&state, auth_user.session(), command).await
}
