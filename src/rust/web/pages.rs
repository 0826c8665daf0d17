//! Page routes and the form-based login/registration flow.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::auth::{
    self, clear_session, set_current_user, CurrentUser, OptionalUser, Registration,
    RegistrationOutcome,
};
use crate::store::UserStore;

use super::{AppError, AppState};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate<'a> {
    error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "signup.html")]
struct SignupTemplate<'a> {
    error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "index.html")]
struct DashboardTemplate<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

fn render<T: Template>(template: &T) -> Result<Response, AppError> {
    Ok(Html(template.render()?).into_response())
}

/// GET /
pub async fn home(OptionalUser(user): OptionalUser) -> Redirect {
    if user.is_some() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

/// GET /login
pub async fn login_page() -> Result<Response, AppError> {
    render(&LoginTemplate { error: None })
}

/// GET /signup
pub async fn signup_page() -> Result<Response, AppError> {
    render(&SignupTemplate { error: None })
}

/// POST /authenticate
pub async fn authenticate<S: UserStore>(
    State(state): State<AppState<S>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let users = state.users()?;
    match auth::authenticate(users, &form.email, &form.password).await? {
        Some(user) => {
            set_current_user(&session, &CurrentUser::from(&user)).await?;
            log::info!("User {} logged in", user.id);
            Ok(Redirect::to("/dashboard").into_response())
        }
        None => render(&LoginTemplate {
            error: Some("Invalid email or password"),
        }),
    }
}

/// POST /register
pub async fn register<S: UserStore>(
    State(state): State<AppState<S>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let users = state.users()?;
    let registration = Registration {
        name: form.name,
        email: form.email,
        password: form.password,
        confirm_password: form.confirm_password,
    };

    let error = match auth::register(users, registration).await? {
        RegistrationOutcome::Registered(_) => return Ok(Redirect::to("/login").into_response()),
        RegistrationOutcome::MissingFields => "All fields are required",
        RegistrationOutcome::PasswordMismatch => "Passwords do not match",
        RegistrationOutcome::EmailTaken => "Email already registered",
    };
    render(&SignupTemplate { error: Some(error) })
}

/// GET /dashboard
pub async fn dashboard(OptionalUser(user): OptionalUser) -> Result<Response, AppError> {
    match user {
        Some(user) => render(&DashboardTemplate {
            name: &user.user_name,
        }),
        None => Ok(Redirect::to("/login").into_response()),
    }
}

/// GET /logout
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_session(&session).await?;
    Ok(Redirect::to("/login"))
}
