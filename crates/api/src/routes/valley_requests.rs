//! In-valley request endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateValleyRequest, RequestKind, RequestRecord, StatusUpdateRequest, ValleyRequest,
};
use domain::services::listing::RequestListQuery;
use shared::pagination::Page;
use uuid::Uuid;
use validator::Validate;

use super::requests::{decide_of_kind, delete_of_kind, get_of_kind, list_of_kind};
use super::{record_outcome, Gateways};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::record_request_created;

/// GET /api/valley-requests
pub async fn list_requests(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Page<RequestRecord>>, ApiError> {
    list_of_kind(&state, &current, RequestKind::Valley, &query)
        .await
        .map(Json)
}

/// File a valley request together with its expense items.
///
/// POST /api/valley-requests
pub async fn create_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateValleyRequest>,
) -> Result<(StatusCode, Json<ValleyRequest>), ApiError> {
    request.validate()?;

    let gateways = Gateways::new(&state);
    let outcome = gateways
        .workflow()
        .submit_valley(&current.actor, request)
        .await?;

    record_request_created(RequestKind::Valley);
    record_outcome(&outcome);

    Ok((StatusCode::CREATED, Json(outcome.record)))
}

/// GET /api/valley-requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestRecord>, ApiError> {
    get_of_kind(&state, &current, RequestKind::Valley, id)
        .await
        .map(Json)
}

/// PATCH /api/valley-requests/:id
pub async fn update_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdateRequest>,
) -> Result<Json<RequestRecord>, ApiError> {
    decide_of_kind(&state, &current, RequestKind::Valley, id, update)
        .await
        .map(Json)
}

/// DELETE /api/valley-requests/:id
pub async fn delete_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_of_kind(&state, &current, RequestKind::Valley, id).await
}
