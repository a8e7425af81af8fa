//! Admin user management route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use domain::models::{CreateUserRequest, UpdateUserRequest, User, UserRole};
use domain::services::listing::{self, UserListQuery};
use persistence::entities::UserRoleDb;
use persistence::repositories::{UserChanges, UserRepository};
use shared::pagination::Page;
use shared::password::{hash_password, validate_password_strength, PasswordError};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;

/// Admin user management routes, nested under `/api/admin/users`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:user_id", patch(update_user).delete(delete_user))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Page<User>>, ApiError> {
    let users: Vec<User> = UserRepository::new(state.pool.clone())
        .find_all()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(listing::list_users(users, &query)?))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    request.validate()?;
    let password_hash = strong_password_hash(&request.password)?;

    let user: User = UserRepository::new(state.pool.clone())
        .create(
            request.name.trim(),
            &request.email.trim().to_lowercase(),
            &password_hash,
            UserRoleDb::from(request.role),
            &request.department,
            &request.designation,
        )
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                ApiError::Conflict("A user with this email already exists".to_string())
            }
            other => other,
        })?
        .into();

    info!(
        user_id = %user.id,
        role = %user.role,
        admin_id = %admin.actor.user_id,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /api/admin/users/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;

    if user_id == admin.actor.user_id && request.role.is_some_and(|r| r != UserRole::Admin) {
        return Err(ApiError::Conflict(
            "Admins cannot remove their own admin role".to_string(),
        ));
    }

    let password_hash = request
        .password
        .as_deref()
        .map(strong_password_hash)
        .transpose()?;

    let changes = UserChanges {
        name: request.name.as_deref().map(str::trim),
        role: request.role.map(UserRoleDb::from),
        department: request.department.as_deref(),
        designation: request.designation.as_deref(),
        password_hash: password_hash.as_deref(),
    };

    let user: User = UserRepository::new(state.pool.clone())
        .update(user_id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    info!(
        user_id = %user.id,
        role = %user.role,
        password_changed = password_hash.is_some(),
        admin_id = %admin.actor.user_id,
        "User updated"
    );

    Ok(Json(user))
}

/// Deletes a user together with their requests and notifications.
///
/// DELETE /api/admin/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if user_id == admin.actor.user_id {
        return Err(ApiError::Conflict(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    if !UserRepository::new(state.pool.clone()).delete(user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = %user_id, admin_id = %admin.actor.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn strong_password_hash(password: &str) -> Result<String, ApiError> {
    validate_password_strength(password).map_err(|e| ApiError::Validation(e.to_string()))?;
    hash_password(password).map_err(|e: PasswordError| ApiError::Internal(e.to_string()))
}
