//! Authentication routes: password login and the current user.

use axum::{extract::State, Json};
use domain::models::{LoginRequest, LoginResponse, User};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::services::auth::AuthService;

/// Exchange email and password for a bearer token.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), state.jwt.clone());
    let response = auth_service.login(&request.email, &request.password).await?;

    Ok(Json(response))
}

/// The authenticated user's profile.
///
/// GET /api/auth/me
pub async fn me(current: CurrentUser) -> Json<User> {
    Json(current.user)
}
