use std::sync::Arc;

use crate::store::UserStore;
use crate::tagger::TagPredictor;

use super::AppError;

/// Application state shared across all handlers.
///
/// Either half may be missing: the service still starts when the database
/// or the model is unavailable, and the affected routes report it.
pub struct AppState<S> {
    users: Option<S>,
    tagger: Option<Arc<dyn TagPredictor>>,
}

impl<S: Clone> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            tagger: self.tagger.clone(),
        }
    }
}

impl<S: UserStore> AppState<S> {
    pub fn new(users: Option<S>, tagger: Option<Arc<dyn TagPredictor>>) -> Self {
        Self { users, tagger }
    }

    /// The user store, or `AppError::AuthUnavailable` when the database is down.
    pub fn users(&self) -> Result<&S, AppError> {
        self.users.as_ref().ok_or(AppError::AuthUnavailable)
    }

    pub fn tagger(&self) -> Option<&Arc<dyn TagPredictor>> {
        self.tagger.as_ref()
    }

    pub fn auth_enabled(&self) -> bool {
        self.users.is_some()
    }
}
