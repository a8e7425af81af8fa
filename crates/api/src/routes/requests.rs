//! Travel request endpoint handlers.
//!
//! The listing, read, decision and delete handlers are shared with the
//! valley routes through the `*_of_kind` helpers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateTravelRequest, RequestKind, RequestRecord, StatusUpdateRequest, SubmitExpensesRequest,
    TravelRequest,
};
use domain::services::listing::{self, RequestListQuery};
use domain::services::RequestStore;
use shared::pagination::Page;
use uuid::Uuid;
use validator::Validate;

use super::{record_outcome, Gateways};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::{record_decision, record_request_created};

/// List travel requests visible to the caller.
///
/// GET /api/requests
pub async fn list_requests(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Page<RequestRecord>>, ApiError> {
    list_of_kind(&state, &current, RequestKind::Travel, &query)
        .await
        .map(Json)
}

/// File a travel request for the caller.
///
/// POST /api/requests
pub async fn create_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateTravelRequest>,
) -> Result<(StatusCode, Json<TravelRequest>), ApiError> {
    request.validate()?;

    let gateways = Gateways::new(&state);
    let outcome = gateways
        .workflow()
        .submit_travel(&current.actor, request)
        .await?;

    record_request_created(RequestKind::Travel);
    record_outcome(&outcome);

    Ok((StatusCode::CREATED, Json(outcome.record)))
}

/// GET /api/requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestRecord>, ApiError> {
    get_of_kind(&state, &current, RequestKind::Travel, id)
        .await
        .map(Json)
}

/// Approve or reject a travel request.
///
/// PATCH /api/requests/:id
pub async fn update_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdateRequest>,
) -> Result<Json<RequestRecord>, ApiError> {
    decide_of_kind(&state, &current, RequestKind::Travel, id, update)
        .await
        .map(Json)
}

/// DELETE /api/requests/:id
pub async fn delete_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_of_kind(&state, &current, RequestKind::Travel, id).await
}

/// Submit the expense phase of an approved travel request.
///
/// PATCH /api/requests/:id/expenses
pub async fn submit_expenses(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(submission): Json<SubmitExpensesRequest>,
) -> Result<Json<TravelRequest>, ApiError> {
    submission.validate()?;

    let gateways = Gateways::new(&state);
    let outcome = gateways
        .workflow()
        .submit_travel_expenses(&current.actor, id, &submission)
        .await?;

    record_outcome(&outcome);
    Ok(Json(outcome.record))
}

pub(crate) async fn list_of_kind(
    state: &AppState,
    current: &CurrentUser,
    kind: RequestKind,
    query: &RequestListQuery,
) -> Result<Page<RequestRecord>, ApiError> {
    // Narrow in SQL when the caller may only see their own requests.
    let owner = (!current.actor.role.sees_all_requests()).then_some(current.actor.user_id);

    let records = Gateways::new(state).store.find_kind(kind, owner).await?;
    let visible = listing::visible_to(&current.actor, records);

    Ok(listing::list_requests(visible, query)?)
}

/// Requests the caller may not see are reported as missing.
pub(crate) async fn get_of_kind(
    state: &AppState,
    current: &CurrentUser,
    kind: RequestKind,
    id: Uuid,
) -> Result<RequestRecord, ApiError> {
    let record = Gateways::new(state)
        .store
        .find(kind, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", kind.label())))?;

    let visible = current.actor.role.sees_all_requests()
        || record.employee_id() == current.actor.user_id;
    if !visible {
        return Err(ApiError::NotFound(format!("{} not found", kind.label())));
    }
    Ok(record)
}

pub(crate) async fn decide_of_kind(
    state: &AppState,
    current: &CurrentUser,
    kind: RequestKind,
    id: Uuid,
    update: StatusUpdateRequest,
) -> Result<RequestRecord, ApiError> {
    update.validate()?;

    let gateways = Gateways::new(state);
    let outcome = gateways
        .workflow()
        .decide(&current.actor, kind, id, &update)
        .await?;

    record_decision(kind, outcome.record.status());
    record_outcome(&outcome);

    Ok(outcome.record)
}

pub(crate) async fn delete_of_kind(
    state: &AppState,
    current: &CurrentUser,
    kind: RequestKind,
    id: Uuid,
) -> Result<StatusCode, ApiError> {
    Gateways::new(state)
        .workflow()
        .delete(&current.actor, kind, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
