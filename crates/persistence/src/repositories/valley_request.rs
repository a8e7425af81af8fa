//! Valley request repository for database operations.

use domain::models::{NewValleyRequest, RequestStatus};
use domain::services::StatusChange;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::valley_request::VALLEY_REQUEST_COLUMNS;
use crate::entities::{ExpenseCategoryDb, RequestStatusDb, ValleyRequestEntity};
use crate::metrics::QueryTimer;
use crate::repositories::travel_request::review_columns;

/// Repository for valley request database operations.
#[derive(Clone)]
pub struct ValleyRequestRepository {
    pool: PgPool,
}

impl ValleyRequestRepository {
    /// Creates a new ValleyRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<ValleyRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_all_valley_requests");
        let sql = format!(
            "SELECT {} FROM valley_requests ORDER BY created_at DESC",
            VALLEY_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, ValleyRequestEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_employee_id(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<ValleyRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_valley_requests_by_employee");
        let sql = format!(
            "SELECT {} FROM valley_requests WHERE employee_id = $1 ORDER BY created_at DESC",
            VALLEY_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, ValleyRequestEntity>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ValleyRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_valley_request_by_id");
        let sql = format!(
            "SELECT {} FROM valley_requests WHERE id = $1",
            VALLEY_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, ValleyRequestEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Inserts a valley request and its items in one transaction.
    pub async fn create(&self, new: &NewValleyRequest) -> Result<ValleyRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_valley_request");
        let d = &new.details;
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO valley_requests (
                employee_id, employee_name, department, designation, request_type,
                project, purpose, expense_date, total_amount,
                previous_outstanding_advance, status, phase
            )
            VALUES ($1, $2, $3, $4, 'in-valley', $5, $6, $7, $8, $9, 'pending', 2)
            RETURNING {}
            "#,
            VALLEY_REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, ValleyRequestEntity>(&sql)
            .bind(new.employee.id)
            .bind(&new.employee.name)
            .bind(&new.employee.department)
            .bind(&new.employee.designation)
            .bind(&d.project)
            .bind(&d.purpose)
            .bind(d.expense_date)
            .bind(new.total_amount)
            .bind(d.previous_outstanding_advance)
            .fetch_one(&mut *tx)
            .await?;

        for item in &d.expenses {
            sqlx::query(
                r#"
                INSERT INTO valley_expense_items (request_id, category, amount, description)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(request.id)
            .bind(ExpenseCategoryDb::from(item.category))
            .bind(item.amount)
            .bind(&item.description)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(request)
    }

    /// Writes a review decision if the request is still in `expected`.
    pub async fn update_status(
        &self,
        id: Uuid,
        expected: RequestStatus,
        change: &StatusChange,
    ) -> Result<Option<ValleyRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_valley_request_status");
        let (reviewer_column, comments_column) = review_columns(change.stage);
        let sql = format!(
            r#"
            UPDATE valley_requests
            SET status = $3,
                {reviewer_column} = $4,
                {comments_column} = $5,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {columns}
            "#,
            columns = VALLEY_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, ValleyRequestEntity>(&sql)
            .bind(id)
            .bind(RequestStatusDb::from(expected))
            .bind(RequestStatusDb::from(change.next))
            .bind(change.reviewer_id)
            .bind(&change.comments)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_valley_request");
        let result = sqlx::query("DELETE FROM valley_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
