//! Receipt upload and listing handlers.

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{Receipt, RequestKind, RequestRecord};
use persistence::repositories::{ExpenseRepository, ReceiptRepository};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::parse_kind;
use super::requests::get_of_kind;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::services::receipt_storage::{ReceiptStorage, ReceiptUpload};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptListQuery {
    pub expense_item_id: Uuid,
    pub kind: Option<RequestKind>,
}

/// Receipts attached to one expense item.
///
/// GET /api/receipts?expenseItemId=<uuid>&kind=travel|valley
pub async fn list_receipts(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ReceiptListQuery>,
) -> Result<Json<Vec<Receipt>>, ApiError> {
    let kind = query.kind.unwrap_or(RequestKind::Travel);
    parent_request(&state, &current, kind, query.expense_item_id).await?;

    let receipts = ReceiptRepository::new(state.pool.clone())
        .find_by_expense_item(kind, query.expense_item_id)
        .await?;

    Ok(Json(receipts.into_iter().map(Into::into).collect()))
}

/// Upload one receipt file for an expense item.
///
/// POST /api/receipts/upload (multipart: `expenseItemId`, `kind`, `file`)
pub async fn upload_receipt(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Receipt>), ApiError> {
    let upload = read_upload(multipart).await?;

    let request = parent_request(&state, &current, upload.kind, upload.expense_item_id).await?;
    if request.employee_id() != current.actor.user_id && !current.actor.is_admin() {
        return Err(ApiError::Forbidden(
            "Only the employee who filed the request can attach receipts".to_string(),
        ));
    }

    let storage = ReceiptStorage::new(&state.config.storage);
    let new_receipt = storage.store(&upload).await?;

    let receipt = match ReceiptRepository::new(state.pool.clone())
        .create(&new_receipt)
        .await
    {
        Ok(entity) => Receipt::from(entity),
        Err(e) => {
            storage.discard(&new_receipt).await;
            return Err(e.into());
        }
    };

    info!(
        receipt_id = %receipt.id,
        expense_item_id = %receipt.expense_item_id,
        user_id = %current.actor.user_id,
        file_type = %receipt.file_type,
        "Receipt uploaded"
    );

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// The request owning an expense item, if the caller may see it.
async fn parent_request(
    state: &AppState,
    current: &CurrentUser,
    kind: RequestKind,
    expense_item_id: Uuid,
) -> Result<RequestRecord, ApiError> {
    let item = ExpenseRepository::new(state.pool.clone())
        .find_by_id(kind, expense_item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Expense item not found".to_string()))?;

    get_of_kind(state, current, kind, item.request_id).await
}

async fn read_upload(mut multipart: Multipart) -> Result<ReceiptUpload, ApiError> {
    let mut expense_item_id = None;
    let mut kind = RequestKind::Travel;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "expenseItemId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                let id = Uuid::parse_str(text.trim()).map_err(|_| {
                    ApiError::Validation("expenseItemId must be a UUID".to_string())
                })?;
                expense_item_id = Some(id);
            }
            "kind" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                kind = parse_kind(&text).ok_or_else(|| {
                    ApiError::Validation("kind must be 'travel' or 'valley'".to_string())
                })?;
            }
            "file" => {
                let original_filename = field.file_name().unwrap_or("receipt").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read file: {}", e)))?;
                file = Some((original_filename, content_type, content.to_vec()));
            }
            _ => {}
        }
    }

    let expense_item_id = expense_item_id
        .ok_or_else(|| ApiError::Validation("expenseItemId is required".to_string()))?;
    let (original_filename, content_type, content) =
        file.ok_or_else(|| ApiError::Validation("file is required".to_string()))?;

    Ok(ReceiptUpload {
        expense_item_id,
        kind,
        original_filename,
        content_type,
        content,
    })
}
