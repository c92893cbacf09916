//! Moderation Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::{run_command, ApiError, AppState, CommandResponse};
use crate::auth::AuthUser;
use crate::dispatch::Command;
use crate::moderation::ModerationAction;

#[derive(Debug, Deserialize)]
pub struct AnnouncementRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub username: String,
}

/// POST /api/moderation/announcements
pub async fn announce(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<AnnouncementRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let action = ModerationAction::Announce { text: body.text };
    run_command(&state, auth_user.session(), Command::Moderate(action)).await
}

/// POST /api/moderation/kick
pub async fn kick(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<TargetRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let action = ModerationAction::Kick {
        target: body.username,
    };
    run_command(&state, auth_user.session(), Command::Moderate(action)).await
}

/// POST /api/moderation/admins
pub async fn grant_admin(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<TargetRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let action = ModerationAction::GrantAdmin {
        target: body.username,
    };
    run_command(&state, auth_user.session(), Command::Moderate(action)).await
}

/// DELETE /api/moderation/admins/{username}
pub async fn revoke_admin(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    let action = ModerationAction::RevokeAdmin { target: username };
    run_command(&state, auth_user.session(), Command::Moderate(action)).await
}

/// POST /api/moderation/rooms/{room}/clear
pub async fn clear_chat(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(room): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    let action = ModerationAction::ClearChat { room };
    run_command(&state, auth_user.session(), Command::Moderate(action)).await
}
