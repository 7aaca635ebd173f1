//! Account role management commands.
//!
//! ```bash
//! # Create an admin (password from -p or BAZAAR_ADMIN_PASSWORD)
//! bazaar-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # Change the role of an existing account
//! bazaar-cli admin promote -e someone@example.com
//! bazaar-cli admin demote -e someone@example.com
//!
//! # Replace a forgotten password
//! bazaar-cli admin reset-password -e someone@example.com
//! ```

use secrecy::{ExposeSecret, SecretString};

use bazaar_api::services::auth::AuthService;
use bazaar_core::UserRole;

use super::{CommandError, connect};

/// Create a new admin account.
///
/// # Errors
///
/// Returns `CommandError::Auth` for invalid input or an existing email.
pub async fn create(email: &str, name: &str, password: &SecretString) -> Result<(), CommandError> {
    let pool = connect().await?;
    let user = AuthService::new(&pool)
        .create_admin(email, password.expose_secret(), name)
        .await?;

    tracing::info!(
        "Admin created! ID: {}, Email: {}, Name: {}",
        user.id,
        user.email,
        user.name
    );
    Ok(())
}

/// Set the role of an existing account.
///
/// # Errors
///
/// Returns `CommandError::Auth` if no account uses `email`.
pub async fn set_role(email: &str, role: UserRole) -> Result<(), CommandError> {
    let pool = connect().await?;
    let auth = AuthService::new(&pool);

    let user = auth.get_user_by_email(email).await?;
    if user.role == role {
        tracing::info!("{} is already {}", user.email, role);
        return Ok(());
    }

    let user = auth.set_role(None, user.id, role).await?;
    tracing::info!("{} is now {}", user.email, user.role);
    Ok(())
}

/// Replace the password of an existing account.
///
/// # Errors
///
/// Returns `CommandError::Auth` for a weak password or unknown email.
pub async fn reset_password(email: &str, password: &SecretString) -> Result<(), CommandError> {
    let pool = connect().await?;
    let auth = AuthService::new(&pool);

    let user = auth.get_user_by_email(email).await?;
    auth.reset_password(user.id, password.expose_secret()).await?;

    tracing::info!("Password updated for {}", user.email);
    Ok(())
}
