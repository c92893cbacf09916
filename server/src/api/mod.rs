//! API Router and Application State
//!
//! Central routing configuration and shared state.

mod error;
pub mod moderation;
pub mod uploads;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth,
    config::Config,
    dispatch::{Command, CommandDispatcher, FeedbackCollector, Notice},
    session::Session,
};

pub use error::{status_for, ApiError, ErrorBody};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Routes commands to moderation and uploads
    pub dispatcher: Arc<CommandDispatcher>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: Config, dispatcher: CommandDispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Check if image uploads are available.
    #[must_use]
    pub fn has_uploads(&self) -> bool {
        self.dispatcher.uploads().is_some()
    }
}

/// Successful command response.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: &'static str,
    pub notices: Vec<Notice>,
}

/// Dispatch `command` and turn the collected notices into a response.
pub(crate) async fn run_command(
    state: &AppState,
    session: &Session,
    command: Command,
) -> Result<Json<CommandResponse>, ApiError> {
    let sink = FeedbackCollector::new();

    match state.dispatcher.dispatch(command, session, &sink).await {
        Ok(()) => Ok(Json(CommandResponse {
            status: "ok",
            notices: sink.take(),
        })),
        Err(error) => Err(ApiError::Command {
            error,
            notices: sink.take(),
        }),
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Leave room for multipart framing so oversize files reach validation
    let body_limit = state.config.body_limit();

    let moderation_routes = Router::new()
        .route("/announcements", post(moderation::announce))
        .route("/kick", post(moderation::kick))
        .route("/admins", post(moderation::grant_admin))
        .route("/admins/{username}", delete(moderation::revoke_admin))
        .route("/rooms/{room}/clear", post(moderation::clear_chat));

    // Protected routes that require authentication
    let protected_routes = Router::new()
        .nest("/api/moderation", moderation_routes)
        .route(
            "/api/uploads",
            post(uploads::upload_image).layer(DefaultBodyLimit::max(body_limit)),
        )
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(protected_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Whether image uploads are enabled
    uploads: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uploads: state.has_uploads(),
    })
}
