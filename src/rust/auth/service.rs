use crate::store::{NewUser, StoreError, User, UserStore};

use super::{hash_password, verify_password, AuthError};

/// Sign-up form contents.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug)]
pub enum RegistrationOutcome {
    Registered(User),
    MissingFields,
    PasswordMismatch,
    EmailTaken,
}

#[derive(Debug)]
pub enum LoginOutcome {
    LoggedIn(User),
    InvalidPassword,
    Created(User),
}

/// Returns the user when `email` exists and `password` matches.
pub async fn authenticate<S: UserStore>(
    store: &S,
    email: &str,
    password: &str,
) -> Result<Option<User>, AuthError> {
    let Some(user) = store.find_by_email(email.trim()).await? else {
        return Ok(None);
    };
    if verify_password(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Creates a user from the sign-up form.
///
/// The email is checked before insert; a concurrent registration that
/// slips past the check is caught by the unique constraint and reported
/// the same way.
pub async fn register<S: UserStore>(
    store: &S,
    form: Registration,
) -> Result<RegistrationOutcome, AuthError> {
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Ok(RegistrationOutcome::MissingFields);
    }
    if form.password != form.confirm_password {
        return Ok(RegistrationOutcome::PasswordMismatch);
    }
    if store.find_by_email(email).await?.is_some() {
        return Ok(RegistrationOutcome::EmailTaken);
    }

    let new_user = NewUser {
        name: Some(name.to_string()),
        email: email.to_string(),
        password_hash: hash_password(&form.password)?,
    };
    match store.create(new_user).await {
        Ok(user) => {
            log::info!("Registered user {}", user.id);
            Ok(RegistrationOutcome::Registered(user))
        }
        Err(StoreError::DuplicateEmail(_)) => Ok(RegistrationOutcome::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

/// Logs in an existing user, or creates an account for an unknown email.
pub async fn login_or_register<S: UserStore>(
    store: &S,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, AuthError> {
    let email = email.trim();
    if let Some(user) = store.find_by_email(email).await? {
        return if verify_password(password, &user.password_hash)? {
            Ok(LoginOutcome::LoggedIn(user))
        } else {
            Ok(LoginOutcome::InvalidPassword)
        };
    }

    let new_user = NewUser {
        name: None,
        email: email.to_string(),
        password_hash: hash_password(password)?,
    };
    match store.create(new_user).await {
        Ok(user) => Ok(LoginOutcome::Created(user)),
        // Lost a race with another request creating the same account.
        Err(StoreError::DuplicateEmail(_)) => match store.find_by_email(email).await? {
            Some(user) if verify_password(password, &user.password_hash)? => {
                Ok(LoginOutcome::LoggedIn(user))
            }
            _ => Ok(LoginOutcome::InvalidPassword),
        },
        Err(e) => Err(e.into()),
    }
}
