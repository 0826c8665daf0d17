//! The TagWizard web service: pages, session auth and the tagging endpoint.

mod error;
mod pages;
mod state;
mod tags;

pub use error::AppError;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};

use crate::store::UserStore;

/// Build the router. The caller adds the session layer.
pub fn router<S: UserStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login_page))
        .route("/authenticate", post(pages::authenticate::<S>))
        .route("/signup", get(pages::signup_page))
        .route("/register", post(pages::register::<S>))
        .route("/dashboard", get(pages::dashboard))
        .route("/logout", get(pages::logout))
        .route("/get_tags", post(tags::get_tags::<S>))
        .route("/health", get(tags::health::<S>))
        .with_state(state)
}
