//! User persistence.
//!
//! The web service keeps users in MySQL and the login API in PostgreSQL.
//! Both go through [`UserStore`], so the auth logic is written once.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod memory;
mod mysql;
mod postgres;

pub use memory::MemoryUserStore;
pub use mysql::MySqlUserStore;
pub use postgres::PgUserStore;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
}

impl User {
    /// Name shown in the UI, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.email)
    }
}

/// Fields needed to insert a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
}

impl StoreError {
    /// Maps a unique-constraint violation on insert to `DuplicateEmail`.
    fn from_insert(err: sqlx::Error, email: &str) -> Self {
        let is_unique = err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());
        if is_unique {
            Self::DuplicateEmail(email.to_string())
        } else {
            Self::Database(err)
        }
    }
}

/// Lookup and insert of users by email.
pub trait UserStore: Clone + Send + Sync + 'static {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Inserts `user`.
    ///
    /// # Errors
    ///
    /// `StoreError::DuplicateEmail` if the email is taken.
    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, StoreError>> + Send;
}
