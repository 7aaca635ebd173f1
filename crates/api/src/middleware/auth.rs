//! Authentication extractors.
//!
//! Read the `CurrentUser` stored in the session by login/register. Missing
//! sessions reject with 401, non-admin sessions on admin routes with 403.
//! Admin routes also re-read the account, so a demotion applies to sessions
//! that are already open.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Extractor that requires a logged-in admin.
///
/// The session role is only a hint: an admin session is confirmed against
/// the `users` table on every request. A session whose account was demoted
/// is rewritten with the current role; one whose account was deleted is
/// flushed.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(admin_denied(&user, parts));
        }

        let state = AppState::from_ref(state);
        let session = parts.extensions.get::<Session>().cloned();
        let Some(account) = state.users().get_by_id(user.id).await? else {
            if let Some(session) = session {
                clear_current_user(&session).await?;
            }
            return Err(AppError::Unauthorized("Account no longer exists".to_string()));
        };

        let fresh = CurrentUser::from(&account);
        if fresh != user
            && let Some(session) = session
        {
            session.insert(session_keys::CURRENT_USER, &fresh).await?;
        }
        if !fresh.is_admin() {
            return Err(admin_denied(&fresh, parts));
        }

        Ok(Self(fresh))
    }
}

fn admin_denied(user: &CurrentUser, parts: &Parts) -> AppError {
    tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Admin route denied");
    AppError::Forbidden("Admin access required".to_string())
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    // Set by SessionManagerLayer
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Start an authenticated session for `user`.
///
/// Rotates the session ID first so a pre-login ID can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Clear the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
