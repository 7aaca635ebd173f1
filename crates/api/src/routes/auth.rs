//! Authentication route handlers.
//!
//! Email/password registration and login backed by Argon2 hashes in
//! `PostgreSQL`. A successful login or registration rotates the session ID
//! and stores a `CurrentUser` in it.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::AppJson;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User, UserResponse};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Body of `POST /api/auth/register`.
///
/// Not `Debug`: it carries a plaintext password.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create a customer account and log it in.
///
/// # Errors
///
/// 400 for invalid email, password or name; 409 if the email is taken.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<(StatusCode, AppJson<UserResponse>)> {
    let auth = state.auth();
    let user = auth.register(&body.email, &body.password, &body.name).await?;

    start_session(&session, &user).await?;

    Ok((StatusCode::CREATED, AppJson(user.into())))
}

/// Log in with email and password.
///
/// # Errors
///
/// 401 if the email is unknown or the password is wrong.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<AppJson<UserResponse>> {
    let auth = state.auth();
    let user = match auth.login(&body.email, &body.password).await {
        Ok(user) => user,
        // Malformed emails can't belong to anyone; don't reveal the distinction
        Err(AuthError::InvalidEmail(_) | AuthError::InvalidCredentials) => {
            tracing::info!("Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(err) => return Err(err.into()),
    };

    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(AppJson(user.into()))
}

/// End the session.
///
/// # Errors
///
/// 500 if the session store fails.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Current user, reloaded from the database.
///
/// # Errors
///
/// 401 without a session, or if the account no longer exists.
pub async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<AppJson<UserResponse>> {
    let auth = state.auth();
    match auth.get_user(current.id).await {
        Ok(user) => Ok(AppJson(user.into())),
        Err(AuthError::UserNotFound) => {
            clear_current_user(&session).await?;
            Err(AppError::Unauthorized("Account no longer exists".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}
