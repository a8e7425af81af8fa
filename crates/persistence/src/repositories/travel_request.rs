//! Travel request repository for database operations.

use domain::models::{NewTravelRequest, RequestStatus, SubmitExpensesRequest};
use domain::services::{ReviewStage, StatusChange};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::request::{group_members_to_db, TRAVEL_REQUEST_COLUMNS};
use crate::entities::{ExpenseCategoryDb, RequestStatusDb, RequestTypeDb, TravelRequestEntity};
use crate::metrics::QueryTimer;

/// Reviewer id and comment columns written at each review stage.
pub(crate) fn review_columns(stage: ReviewStage) -> (&'static str, &'static str) {
    match stage {
        ReviewStage::Approver => ("approver_id", "approver_comments"),
        ReviewStage::Checker => ("checker_id", "checker_comments"),
    }
}

/// Repository for travel request database operations.
#[derive(Clone)]
pub struct TravelRequestRepository {
    pool: PgPool,
}

impl TravelRequestRepository {
    /// Creates a new TravelRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns every travel request, newest first.
    pub async fn find_all(&self) -> Result<Vec<TravelRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_all_travel_requests");
        let sql = format!(
            "SELECT {} FROM travel_requests ORDER BY created_at DESC",
            TRAVEL_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, TravelRequestEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Returns one employee's travel requests, newest first.
    pub async fn find_by_employee_id(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<TravelRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_travel_requests_by_employee");
        let sql = format!(
            "SELECT {} FROM travel_requests WHERE employee_id = $1 ORDER BY created_at DESC",
            TRAVEL_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, TravelRequestEntity>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TravelRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_travel_request_by_id");
        let sql = format!(
            "SELECT {} FROM travel_requests WHERE id = $1",
            TRAVEL_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, TravelRequestEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Inserts a travel request in `pending`, phase 1, with a zero total.
    pub async fn create(&self, new: &NewTravelRequest) -> Result<TravelRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_travel_request");
        let d = &new.details;
        let sql = format!(
            r#"
            INSERT INTO travel_requests (
                employee_id, employee_name, department, designation, request_type,
                project, purpose, location, travel_date_from, travel_date_to,
                transport_mode, station_pickup_required, station_dropoff_required,
                emergency_reason, emergency_justification, emergency_amount,
                estimated_amount, advance_notes, is_group_travel, is_group_captain,
                group_size, group_members, group_description,
                total_amount, previous_outstanding_advance, status, phase
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, 0, 0, 'pending', 1
            )
            RETURNING {}
            "#,
            TRAVEL_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, TravelRequestEntity>(&sql)
            .bind(new.employee.id)
            .bind(&new.employee.name)
            .bind(&new.employee.department)
            .bind(&new.employee.designation)
            .bind(RequestTypeDb::from(d.request_type))
            .bind(&d.project)
            .bind(&d.purpose)
            .bind(&d.location)
            .bind(d.travel_date_from)
            .bind(d.travel_date_to)
            .bind(d.transport_mode.as_deref().unwrap_or_default())
            .bind(d.station_pickup_required)
            .bind(d.station_dropoff_required)
            .bind(&d.emergency_reason)
            .bind(&d.emergency_justification)
            .bind(d.emergency_amount)
            .bind(d.estimated_amount)
            .bind(&d.advance_notes)
            .bind(d.is_group_travel)
            .bind(d.is_group_captain)
            .bind(d.group_size)
            .bind(group_members_to_db(&d.group_members))
            .bind(&d.group_description)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Writes a review decision if the request is still in `expected`.
    ///
    /// Returns `None` when the row is missing or another decision won.
    pub async fn update_status(
        &self,
        id: Uuid,
        expected: RequestStatus,
        change: &StatusChange,
    ) -> Result<Option<TravelRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_travel_request_status");
        let (reviewer_column, comments_column) = review_columns(change.stage);
        let sql = format!(
            r#"
            UPDATE travel_requests
            SET status = $3,
                {reviewer_column} = $4,
                {comments_column} = $5,
                travel_details_approved_at = CASE WHEN $6 THEN NOW() ELSE travel_details_approved_at END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {columns}
            "#,
            columns = TRAVEL_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, TravelRequestEntity>(&sql)
            .bind(id)
            .bind(RequestStatusDb::from(expected))
            .bind(RequestStatusDb::from(change.next))
            .bind(change.reviewer_id)
            .bind(&change.comments)
            .bind(change.next == RequestStatus::TravelApproved)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Inserts the submitted items and moves the request to verification.
    ///
    /// The request row is locked for the duration; `None` means it was no
    /// longer in `expected`.
    pub async fn submit_expenses(
        &self,
        id: Uuid,
        expected: RequestStatus,
        submission: &SubmitExpensesRequest,
    ) -> Result<Option<TravelRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("submit_travel_expenses");
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM travel_requests
            WHERE id = $1 AND status = $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(RequestStatusDb::from(expected))
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            timer.record();
            return Ok(None);
        }

        for item in &submission.expenses {
            sqlx::query(
                r#"
                INSERT INTO expense_items (request_id, category, amount, description)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(ExpenseCategoryDb::from(item.category))
            .bind(item.amount)
            .bind(&item.description)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!(
            r#"
            UPDATE travel_requests
            SET total_amount = (
                    SELECT COALESCE(SUM(amount), 0) FROM expense_items WHERE request_id = $1
                ),
                previous_outstanding_advance = $2,
                status = 'pending_verification',
                phase = 2,
                expenses_submitted_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TRAVEL_REQUEST_COLUMNS
        );
        let updated = sqlx::query_as::<_, TravelRequestEntity>(&sql)
            .bind(id)
            .bind(submission.previous_outstanding_advance)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(updated))
    }

    /// Deletes a travel request. Items and receipts go with it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_travel_request");
        let result = sqlx::query("DELETE FROM travel_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
