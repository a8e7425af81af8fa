//! In-valley (same-city) expense request models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use shared::validation::{checked_total, validate_non_negative_amount};

use super::expense::NewExpenseItem;
use super::request::{EmployeeSnapshot, Phase, RequestStatus, RequestType};

/// A same-city reimbursement request. Always in the expenses phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValleyRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub department: String,
    pub designation: String,
    pub request_type: RequestType,
    pub project: String,
    pub purpose: String,
    pub expense_date: NaiveDate,
    pub total_amount: Decimal,
    pub previous_outstanding_advance: Decimal,
    pub status: RequestStatus,
    pub phase: Phase,
    pub approver_id: Option<Uuid>,
    pub checker_id: Option<Uuid>,
    pub approver_comments: String,
    pub checker_comments: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating an in-valley request together with its items.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_valley_total"))]
pub struct CreateValleyRequest {
    #[validate(length(min = 1, max = 200, message = "Project must be 1-200 characters"))]
    pub project: String,

    #[validate(length(min = 1, max = 1000, message = "Purpose must be 1-1000 characters"))]
    pub purpose: String,

    pub expense_date: NaiveDate,

    #[validate(
        length(min = 1, max = 100, message = "Submit between 1 and 100 expense items"),
        nested
    )]
    pub expenses: Vec<NewExpenseItem>,

    #[serde(default)]
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub previous_outstanding_advance: Decimal,
}

impl CreateValleyRequest {
    /// Sum of the submitted item amounts; fails if it does not fit a money column.
    pub fn total_amount(&self) -> Result<Decimal, ValidationError> {
        checked_total(self.expenses.iter().map(|item| &item.amount))
    }
}

fn validate_valley_total(request: &CreateValleyRequest) -> Result<(), ValidationError> {
    request.total_amount().map(|_| ())
}

/// Everything the store needs to insert a valley request and its items.
#[derive(Debug, Clone)]
pub struct NewValleyRequest {
    pub employee: EmployeeSnapshot,
    pub details: CreateValleyRequest,
    pub total_amount: Decimal,
}
