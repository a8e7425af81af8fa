//! Admin bootstrap service for initial setup.
//!
//! User accounts can only be created by an admin, so the first admin is
//! created on startup from configuration. Nothing happens once any admin
//! exists.

use persistence::entities::UserRoleDb;
use persistence::repositories::UserRepository;
use shared::password::{hash_password, validate_password_strength, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

/// Creates the configured admin user unless an admin already exists.
///
/// Returns whether a user was created.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<bool, BootstrapError> {
    if config.bootstrap_email.is_empty() {
        return Ok(false);
    }

    if config.bootstrap_password.is_empty() {
        warn!("TE__ADMIN__BOOTSTRAP_EMAIL is set but TE__ADMIN__BOOTSTRAP_PASSWORD is empty - skipping bootstrap");
        return Ok(false);
    }

    let users = UserRepository::new(pool.clone());

    if !users.ids_with_role(UserRoleDb::Admin).await?.is_empty() {
        info!("Admin user already exists - skipping bootstrap");
        return Ok(false);
    }

    if users.find_by_email(&config.bootstrap_email).await?.is_some() {
        warn!(
            email = %config.bootstrap_email,
            "Bootstrap email belongs to a non-admin user - skipping bootstrap"
        );
        return Ok(false);
    }

    validate_password_strength(&config.bootstrap_password)?;
    let password_hash = hash_password(&config.bootstrap_password)?;

    let created = users
        .create(
            &config.bootstrap_name,
            &config.bootstrap_email.to_lowercase(),
            &password_hash,
            UserRoleDb::Admin,
            "",
            "Administrator",
        )
        .await?;

    info!(user_id = %created.id, email = %created.email, "Bootstrap admin created");
    Ok(true)
}
