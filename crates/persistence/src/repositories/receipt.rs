//! Receipt repository for database operations.

use domain::models::{NewReceipt, RequestKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ReceiptEntity, RequestKindDb};
use crate::metrics::QueryTimer;

/// Repository for receipt metadata.
#[derive(Clone)]
pub struct ReceiptRepository {
    pool: PgPool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, receipt: &NewReceipt) -> Result<ReceiptEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_receipt");
        let result = sqlx::query_as::<_, ReceiptEntity>(
            r#"
            INSERT INTO receipts (
                expense_item_id, request_kind, original_filename, stored_filename,
                file_type, storage_path, public_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, expense_item_id, request_kind, original_filename, stored_filename,
                      file_type, storage_path, public_url, upload_date
            "#,
        )
        .bind(receipt.expense_item_id)
        .bind(RequestKindDb::from(receipt.request_kind))
        .bind(&receipt.original_filename)
        .bind(&receipt.stored_filename)
        .bind(&receipt.file_type)
        .bind(&receipt.storage_path)
        .bind(&receipt.public_url)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Receipts attached to one expense item, oldest first.
    pub async fn find_by_expense_item(
        &self,
        kind: RequestKind,
        expense_item_id: Uuid,
    ) -> Result<Vec<ReceiptEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_receipts_by_expense_item");
        let result = sqlx::query_as::<_, ReceiptEntity>(
            r#"
            SELECT id, expense_item_id, request_kind, original_filename, stored_filename,
                   file_type, storage_path, public_url, upload_date
            FROM receipts
            WHERE request_kind = $1 AND expense_item_id = $2
            ORDER BY upload_date
            "#,
        )
        .bind(RequestKindDb::from(kind))
        .bind(expense_item_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
