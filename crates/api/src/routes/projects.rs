//! Project and budget endpoint handlers.
//!
//! Everyone signed in can read; only admins create.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{Budget, CreateBudgetRequest, CreateProjectRequest, Project};
use persistence::repositories::{BudgetRepository, ProjectRepository};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminUser, CurrentUser};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetListQuery {
    pub project_id: Option<Uuid>,
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = ProjectRepository::new(state.pool.clone()).find_all().await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    request.validate()?;

    let project: Project = ProjectRepository::new(state.pool.clone())
        .create(request.name.trim(), &request.description, request.active)
        .await?
        .into();

    info!(
        project_id = %project.id,
        name = %project.name,
        user_id = %admin.actor.user_id,
        "Project created"
    );

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/budgets
pub async fn list_budgets(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(query): Query<BudgetListQuery>,
) -> Result<Json<Vec<Budget>>, ApiError> {
    let budgets = BudgetRepository::new(state.pool.clone()).find_all().await?;

    Ok(Json(
        budgets
            .into_iter()
            .map(Budget::from)
            .filter(|b| query.project_id.map_or(true, |id| b.project_id == id))
            .collect(),
    ))
}

/// Allocate a new budget row; the newest row per project is the one charged.
///
/// POST /api/budgets
pub async fn create_budget(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    request.validate()?;

    ProjectRepository::new(state.pool.clone())
        .find_by_id(request.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let budget: Budget = BudgetRepository::new(state.pool.clone())
        .create(
            request.project_id,
            request.amount,
            &request.fiscal_year,
            &request.description,
        )
        .await?
        .into();

    info!(
        budget_id = %budget.id,
        project_id = %budget.project_id,
        amount = %budget.amount,
        user_id = %admin.actor.user_id,
        "Budget allocated"
    );

    Ok((StatusCode::CREATED, Json(budget)))
}
