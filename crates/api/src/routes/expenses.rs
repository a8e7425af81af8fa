//! Expense item endpoint handlers for both request kinds.

use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{AddExpenseItemRequest, ExpenseItem, RequestKind};
use persistence::repositories::ExpenseRepository;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::requests::get_of_kind;
use super::Gateways;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListQuery {
    pub request_id: Option<Uuid>,
}

/// GET /api/expenses
pub async fn list_travel_expenses(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Vec<ExpenseItem>>, ApiError> {
    list_items(&state, &current, RequestKind::Travel, &query)
        .await
        .map(Json)
}

/// POST /api/expenses
pub async fn add_travel_expense(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<AddExpenseItemRequest>,
) -> Result<(StatusCode, Json<ExpenseItem>), ApiError> {
    add_item(&state, &current, RequestKind::Travel, request)
        .await
        .map(|item| (StatusCode::CREATED, Json(item)))
}

/// GET /api/valley-expenses
pub async fn list_valley_expenses(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Vec<ExpenseItem>>, ApiError> {
    list_items(&state, &current, RequestKind::Valley, &query)
        .await
        .map(Json)
}

/// POST /api/valley-expenses
pub async fn add_valley_expense(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<AddExpenseItemRequest>,
) -> Result<(StatusCode, Json<ExpenseItem>), ApiError> {
    add_item(&state, &current, RequestKind::Valley, request)
        .await
        .map(|item| (StatusCode::CREATED, Json(item)))
}

/// Items of one request, or of every request the caller can see.
async fn list_items(
    state: &AppState,
    current: &CurrentUser,
    kind: RequestKind,
    query: &ExpenseListQuery,
) -> Result<Vec<ExpenseItem>, ApiError> {
    let repo = ExpenseRepository::new(state.pool.clone());

    if let Some(request_id) = query.request_id {
        get_of_kind(state, current, kind, request_id).await?;
        let items = repo.find_by_request(kind, request_id).await?;
        return Ok(items.into_iter().map(Into::into).collect());
    }

    let items = repo.find_all(kind).await?;
    if current.actor.role.sees_all_requests() {
        return Ok(items.into_iter().map(Into::into).collect());
    }

    let own: HashSet<Uuid> = Gateways::new(state)
        .store
        .find_kind(kind, Some(current.actor.user_id))
        .await?
        .iter()
        .map(|r| r.id())
        .collect();

    Ok(items
        .into_iter()
        .filter(|item| own.contains(&item.request_id))
        .map(Into::into)
        .collect())
}

async fn add_item(
    state: &AppState,
    current: &CurrentUser,
    kind: RequestKind,
    request: AddExpenseItemRequest,
) -> Result<ExpenseItem, ApiError> {
    request.validate()?;

    let gateways = Gateways::new(state);
    let item = gateways
        .workflow()
        .add_expense_item(&current.actor, kind, request.request_id, &request.item)
        .await?;

    Ok(item)
}
