use thiserror::Error;

use bazaar_core::EmailError;

use crate::db::RepositoryError;

/// Failures of [`AuthService`](super::AuthService) operations.
#[derive(Debug, Error)]
pub enum AuthError {
    // Input rejected before any I/O.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("weak password: {0}")]
    WeakPassword(String),
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Unknown email or wrong password; the two are never distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("email already registered")]
    UserAlreadyExists,
    /// The acting admin targeted their own account with a non-admin role.
    #[error("admin cannot demote their own account")]
    SelfDemotion,

    #[error("argon2 hashing failed")]
    PasswordHash,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
