//! Email/password authentication shared by the web service and the login API.

mod password;
mod service;
mod session;

pub use password::{hash_password, verify_password};
pub use service::{
    authenticate, login_or_register, register, LoginOutcome, Registration, RegistrationOutcome,
};
pub use session::{
    clear_session, create_session_layer, session_keys, set_current_user, CurrentUser,
    OptionalUser, RequireUser, SESSION_COOKIE_NAME,
};

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}
