//! Expense item repository for database operations.
//!
//! Travel items live in `expense_items`, valley items in
//! `valley_expense_items`; every method takes the request kind.

use domain::models::{NewExpenseItem, RequestKind, RequestStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ExpenseCategoryDb, ExpenseItemEntity, RequestStatusDb};
use crate::metrics::QueryTimer;

const ITEM_COLUMNS: &str = "id, request_id, category, amount, description, created_at";

fn items_table(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Travel => "expense_items",
        RequestKind::Valley => "valley_expense_items",
    }
}

fn requests_table(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Travel => "travel_requests",
        RequestKind::Valley => "valley_requests",
    }
}

/// Repository for expense item database operations.
#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self, kind: RequestKind) -> Result<Vec<ExpenseItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_all_expense_items");
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at DESC",
            ITEM_COLUMNS,
            items_table(kind)
        );
        let result = sqlx::query_as::<_, ExpenseItemEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_request(
        &self,
        kind: RequestKind,
        request_id: Uuid,
    ) -> Result<Vec<ExpenseItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_expense_items_by_request");
        let sql = format!(
            "SELECT {} FROM {} WHERE request_id = $1 ORDER BY created_at",
            ITEM_COLUMNS,
            items_table(kind)
        );
        let result = sqlx::query_as::<_, ExpenseItemEntity>(&sql)
            .bind(request_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(
        &self,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<Option<ExpenseItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_expense_item_by_id");
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            ITEM_COLUMNS,
            items_table(kind)
        );
        let result = sqlx::query_as::<_, ExpenseItemEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Adds one item while the parent request is still in `expected`.
    ///
    /// Valley totals are recomputed in the same transaction. Returns `None`
    /// when the parent is missing or has moved on.
    pub async fn add_item(
        &self,
        kind: RequestKind,
        request_id: Uuid,
        expected: RequestStatus,
        item: &NewExpenseItem,
    ) -> Result<Option<ExpenseItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("add_expense_item");
        let mut tx = self.pool.begin().await?;

        let lock_sql = format!(
            "SELECT id FROM {} WHERE id = $1 AND status = $2 FOR UPDATE",
            requests_table(kind)
        );
        let locked = sqlx::query_scalar::<_, Uuid>(&lock_sql)
            .bind(request_id)
            .bind(RequestStatusDb::from(expected))
            .fetch_optional(&mut *tx)
            .await?;

        if locked.is_none() {
            timer.record();
            return Ok(None);
        }

        let insert_sql = format!(
            r#"
            INSERT INTO {} (request_id, category, amount, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            items_table(kind),
            ITEM_COLUMNS
        );
        let created = sqlx::query_as::<_, ExpenseItemEntity>(&insert_sql)
            .bind(request_id)
            .bind(ExpenseCategoryDb::from(item.category))
            .bind(item.amount)
            .bind(&item.description)
            .fetch_one(&mut *tx)
            .await?;

        if kind == RequestKind::Valley {
            sqlx::query(
                r#"
                UPDATE valley_requests
                SET total_amount = (
                        SELECT COALESCE(SUM(amount), 0)
                        FROM valley_expense_items
                        WHERE request_id = $1
                    ),
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(Some(created))
    }
}
