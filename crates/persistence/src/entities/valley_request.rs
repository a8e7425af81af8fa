//! Valley request entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Phase, ValleyRequest};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::request::{phase_from_db, RequestStatusDb, RequestTypeDb};

/// Database row mapping for the valley_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct ValleyRequestEntity {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub request_type: RequestTypeDb,
    pub project: Option<String>,
    pub purpose: Option<String>,
    pub expense_date: Option<NaiveDate>,
    pub total_amount: Option<Decimal>,
    pub previous_outstanding_advance: Option<Decimal>,
    pub status: RequestStatusDb,
    pub phase: i16,
    pub approver_id: Option<Uuid>,
    pub checker_id: Option<Uuid>,
    pub approver_comments: Option<String>,
    pub checker_comments: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub(crate) const VALLEY_REQUEST_COLUMNS: &str = r#"
    id, employee_id, employee_name, department, designation, request_type, project,
    purpose, expense_date, total_amount, previous_outstanding_advance, status, phase,
    approver_id, checker_id, approver_comments, checker_comments, created_at, updated_at
"#;

impl From<ValleyRequestEntity> for ValleyRequest {
    fn from(entity: ValleyRequestEntity) -> Self {
        let now = Utc::now();
        Self {
            id: entity.id,
            employee_id: entity.employee_id,
            employee_name: entity.employee_name.unwrap_or_default(),
            department: entity.department.unwrap_or_default(),
            designation: entity.designation.unwrap_or_default(),
            request_type: entity.request_type.into(),
            project: entity.project.unwrap_or_default(),
            purpose: entity.purpose.unwrap_or_default(),
            expense_date: entity.expense_date.unwrap_or(now.date_naive()),
            total_amount: entity.total_amount.unwrap_or_default(),
            previous_outstanding_advance: entity
                .previous_outstanding_advance
                .unwrap_or_default(),
            status: entity.status.into(),
            phase: phase_from_db(entity.id, entity.phase, Phase::Expenses),
            approver_id: entity.approver_id,
            checker_id: entity.checker_id,
            approver_comments: entity.approver_comments.unwrap_or_default(),
            checker_comments: entity.checker_comments.unwrap_or_default(),
            created_at: entity.created_at.unwrap_or(now),
            updated_at: entity.updated_at.unwrap_or(now),
        }
    }
}
