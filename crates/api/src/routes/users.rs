//! Admin user management.

use axum::extract::State;
use serde::Deserialize;

use bazaar_core::{UserId, UserRole};

use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::RequireAdmin;
use crate::models::UserResponse;
use crate::models::product::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::state::AppState;

/// Paging for `GET /api/users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Body of `PATCH /api/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: UserRole,
}

/// List accounts, oldest first.
///
/// # Errors
///
/// 400 for out-of-range paging.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(query): AppQuery<UserListQuery>,
) -> Result<AppJson<Vec<UserResponse>>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit: must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::BadRequest("offset: cannot be negative".to_string()));
    }

    let users = state.users().list(limit, offset).await?;
    Ok(AppJson(users.into_iter().map(UserResponse::from).collect()))
}

/// Grant or revoke the admin role.
///
/// # Errors
///
/// 400 if an admin demotes themselves; 404 if the user doesn't exist.
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<UserId>,
    AppJson(body): AppJson<RoleChange>,
) -> Result<AppJson<UserResponse>> {
    let user = state.auth().set_role(Some(admin.id), id, body.role).await?;

    Ok(AppJson(user.into()))
}
