//! Standalone JSON login service.
//!
//! `POST /api/login` logs an existing user in, or creates an account when
//! the email is unknown. Runs against its own PostgreSQL database and keeps
//! no session.

use axum::{
    body::Bytes, extract::State, http::StatusCode, response::IntoResponse, routing::post, Json,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::auth::{login_or_register, LoginOutcome};
use crate::store::UserStore;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

fn reply(status: StatusCode, success: bool, message: &str) -> (StatusCode, Json<LoginResponse>) {
    (
        status,
        Json(LoginResponse {
            success,
            message: message.to_string(),
        }),
    )
}

/// POST /api/login
///
/// The body is read as JSON whatever the content type says, so every
/// reply uses the `{success, message}` shape.
pub async fn login<S: UserStore>(State(store): State<S>, body: Bytes) -> impl IntoResponse {
    let req: LoginRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            log::debug!("Rejected /api/login body: {}", e);
            return reply(StatusCode::BAD_REQUEST, false, "Invalid JSON body");
        }
    };
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    if email.trim().is_empty() || password.is_empty() {
        return reply(StatusCode::BAD_REQUEST, false, "Email and password are required");
    }

    match login_or_register(&store, &email, &password).await {
        Ok(LoginOutcome::LoggedIn(_)) => reply(StatusCode::OK, true, "Login successful"),
        Ok(LoginOutcome::InvalidPassword) => {
            reply(StatusCode::UNAUTHORIZED, false, "Invalid password")
        }
        Ok(LoginOutcome::Created(user)) => {
            log::info!("Created account {}", user.id);
            reply(StatusCode::CREATED, true, "Account created")
        }
        Err(e) => {
            log::error!("Login failed: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, false, "Internal server error")
        }
    }
}

pub fn router<S: UserStore>(store: S) -> Router {
    Router::new()
        .route("/api/login", post(login::<S>))
        .layer(CorsLayer::permissive())
        .with_state(store)
}
