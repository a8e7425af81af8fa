//! User JWT authentication middleware.
//!
//! Validates the Bearer token on every protected route and stores the token
//! subject in request extensions. The caller's role is resolved later by the
//! [`CurrentUser`](crate::extractors::CurrentUser) extractor.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use crate::error::ApiError;
use crate::services::auth::normalize_pem_key;
use shared::jwt::{extract_user_id, JwtConfig, JwtError};

/// Authenticated token information extracted from the JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti) for log correlation.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns the token subject.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id = extract_user_id(&claims).map_err(|e| e.to_string())?;

        Ok(UserAuth {
            user_id,
            jti: claims.jti,
        })
    }

    /// Creates a JwtConfig from JwtAuthConfig.
    ///
    /// Parses both PEM keys, so call it once at startup and share the result.
    pub fn create_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, JwtError> {
        JwtConfig::with_leeway(
            &normalize_pem_key(&config.private_key),
            &normalize_pem_key(&config.public_key),
            config.access_token_expiry_secs,
            config.leeway_secs,
        )
    }

    /// Validates the `Authorization` header value of a request.
    pub fn from_header(jwt_config: &JwtConfig, value: Option<&str>) -> Result<Self, ApiError> {
        let token = bearer_token(value)?;

        Self::validate(jwt_config, token).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

fn bearer_token(value: Option<&str>) -> Result<&str, ApiError> {
    match value.and_then(|v| v.strip_prefix("Bearer ")) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::Unauthorized(
            "Missing or invalid Authorization header".to_string(),
        )),
    }
}

/// Middleware that requires JWT user authentication.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match UserAuth::from_header(&state.jwt, header_value) {
        Ok(auth) => {
            if let Some(span) = req.extensions().get::<tracing::Span>() {
                span.record("user_id", tracing::field::display(auth.user_id));
            }
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert!(bearer_token(None).is_err());
        assert!(bearer_token(Some("Basic dXNlcjpwdw==")).is_err());
        assert!(bearer_token(Some("Bearer   ")).is_err());
    }

    #[test]
    fn test_validate_round_trip() {
        let config = crate::test_support::jwt_auth_config();
        let jwt = UserAuth::create_jwt_config(&config).unwrap();
        let user_id = Uuid::new_v4();
        let issued = jwt.issue_access_token(user_id).unwrap();

        let auth = UserAuth::validate(&jwt, &issued.token).unwrap();
        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.jti, issued.jti);

        let header = format!("Bearer {}", issued.token);
        let auth = UserAuth::from_header(&jwt, Some(&header)).unwrap();
        assert_eq!(auth.user_id, user_id);
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let jwt = UserAuth::create_jwt_config(&crate::test_support::jwt_auth_config()).unwrap();
        let result = UserAuth::from_header(&jwt, Some("Bearer not.a.token"));
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));

        let result = UserAuth::from_header(&jwt, None);
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_create_jwt_config_rejects_unusable_keys() {
        let config = JwtAuthConfig {
            private_key: "not-a-pem".to_string(),
            public_key: "not-a-pem".to_string(),
            access_token_expiry_secs: 3600,
            leeway_secs: 30,
        };
        assert!(matches!(
            UserAuth::create_jwt_config(&config),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_create_jwt_config_accepts_escaped_pem() {
        let mut config = crate::test_support::jwt_auth_config();
        config.private_key = config.private_key.replace('\n', "\\n");
        config.public_key = format!("\"{}\"", config.public_key.replace('\n', "\\n"));
        assert!(UserAuth::create_jwt_config(&config).is_ok());
    }
}
