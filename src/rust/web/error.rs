//! Error type for the page and auth handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The database was unreachable at startup.
    #[error("Authentication is unavailable")]
    AuthUnavailable,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthUnavailable => {
                log::warn!("Rejected auth request: database unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Authentication is currently unavailable",
                )
                    .into_response()
            }
            // Details stay in the log.
            other => {
                log::error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
