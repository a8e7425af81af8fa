//! Authentication service for password login.

use domain::models::{LoginResponse, User};
use persistence::repositories::UserRepository;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::DatabaseError(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

pub struct AuthService {
    users: UserRepository,
    jwt_config: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt_config: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt_config,
        }
    }

    /// Verifies email and password and issues an access token.
    ///
    /// Unknown emails and wrong passwords yield the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user: User = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?
            .into();

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.jwt_config.issue_access_token(user.id)?;

        info!(user_id = %user.id, role = %user.role, jti = %issued.jti, "User logged in");

        Ok(LoginResponse {
            access_token: issued.token,
            token_type: "Bearer",
            expires_in: issued.expires_in,
            user,
        })
    }
}

/// Turns literal `\n` sequences from env files into real newlines.
pub(crate) fn normalize_pem_key(key: &str) -> String {
    key.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pem_key_escaped_newlines() {
        let raw = "\"-----BEGIN PUBLIC KEY-----\\nABC\\n-----END PUBLIC KEY-----\"";
        let normalized = normalize_pem_key(raw);
        assert_eq!(
            normalized,
            "-----BEGIN PUBLIC KEY-----\nABC\n-----END PUBLIC KEY-----"
        );
    }

    #[test]
    fn test_normalize_pem_key_untouched() {
        let pem = crate::test_support::TEST_PUBLIC_KEY;
        assert_eq!(normalize_pem_key(pem), pem.trim());
    }

    #[test]
    fn test_invalid_credentials_maps_to_unauthorized() {
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
    }
}
