//! Admin reporting.

use axum::{extract::State, Json};
use domain::models::{AdminStats, Budget, User};
use domain::services::stats;
use persistence::repositories::{BudgetRepository, UserRepository};

use super::Gateways;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;

/// Request, user and budget totals across both request kinds.
///
/// GET /api/admin/stats
pub async fn get_admin_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<AdminStats>, ApiError> {
    let records = Gateways::new(&state).store.find_all(None).await?;

    let users: Vec<User> = UserRepository::new(state.pool.clone())
        .find_all()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let budgets: Vec<Budget> = BudgetRepository::new(state.pool.clone())
        .current_budgets()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(stats::compute(&records, &users, &budgets)))
}
