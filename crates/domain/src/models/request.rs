//! Travel request domain models and the types shared by both request kinds.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use shared::validation::{
    checked_total, validate_date_range, validate_group_members, validate_non_negative_amount,
    validate_positive_amount,
};

use super::expense::NewExpenseItem;
use super::valley_request::ValleyRequest;

/// Which request table a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Travel,
    Valley,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Travel => "travel",
            RequestKind::Valley => "valley",
        }
    }

    /// Human label used in notification messages.
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Travel => "travel request",
            RequestKind::Valley => "in-valley request",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "travel" => Ok(RequestKind::Travel),
            "valley" => Ok(RequestKind::Valley),
            _ => Err(format!("Invalid request kind: {}", s)),
        }
    }
}

/// Lifecycle status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    TravelApproved,
    PendingVerification,
    Approved,
    Rejected,
    RejectedByChecker,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 6] = [
        RequestStatus::Pending,
        RequestStatus::TravelApproved,
        RequestStatus::PendingVerification,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::RejectedByChecker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::TravelApproved => "travel_approved",
            RequestStatus::PendingVerification => "pending_verification",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::RejectedByChecker => "rejected_by_checker",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Approved | RequestStatus::Rejected | RequestStatus::RejectedByChecker
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid request status: {}", s))
    }
}

/// Kind of reimbursement being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestType {
    Normal,
    Advance,
    Emergency,
    Group,
    InValley,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Normal => "normal",
            RequestType::Advance => "advance",
            RequestType::Emergency => "emergency",
            RequestType::Group => "group",
            RequestType::InValley => "in-valley",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(RequestType::Normal),
            "advance" => Ok(RequestType::Advance),
            "emergency" => Ok(RequestType::Emergency),
            "group" => Ok(RequestType::Group),
            "in-valley" => Ok(RequestType::InValley),
            _ => Err(format!("Invalid request type: {}", s)),
        }
    }
}

/// Phase 1 collects travel details, phase 2 carries submitted expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum Phase {
    TravelDetails,
    Expenses,
}

impl From<Phase> for i16 {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::TravelDetails => 1,
            Phase::Expenses => 2,
        }
    }
}

impl TryFrom<i16> for Phase {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Phase::TravelDetails),
            2 => Ok(Phase::Expenses),
            other => Err(format!("Invalid phase: {}", other)),
        }
    }
}

/// An employee's travel reimbursement request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub department: String,
    pub designation: String,
    pub request_type: RequestType,
    pub project: String,
    pub purpose: String,
    pub location: String,
    pub travel_date_from: NaiveDate,
    pub travel_date_to: NaiveDate,
    pub transport_mode: String,
    pub station_pickup_required: bool,
    pub station_dropoff_required: bool,
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
    pub travel_details_approved_at: Option<DateTime<Utc>>,
    pub expenses_submitted_at: Option<DateTime<Utc>>,
    pub emergency_reason: Option<String>,
    pub emergency_justification: Option<String>,
    pub emergency_amount: Option<Decimal>,
    pub estimated_amount: Option<Decimal>,
    pub advance_notes: Option<String>,
    pub is_group_travel: bool,
    pub is_group_captain: bool,
    pub group_size: Option<i32>,
    pub group_members: Vec<String>,
    pub group_description: Option<String>,
}

/// Identity of the employee a request is filed for, copied from the users row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeSnapshot {
    pub id: Uuid,
    pub name: String,
    pub department: String,
    pub designation: String,
}

/// Request payload for creating a travel request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_travel_request"))]
pub struct CreateTravelRequest {
    pub request_type: RequestType,

    #[validate(length(min = 1, max = 200, message = "Project must be 1-200 characters"))]
    pub project: String,

    #[validate(length(min = 1, max = 1000, message = "Purpose must be 1-1000 characters"))]
    pub purpose: String,

    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: String,

    pub travel_date_from: NaiveDate,
    pub travel_date_to: NaiveDate,

    #[validate(length(max = 50, message = "Transport mode must be at most 50 characters"))]
    pub transport_mode: Option<String>,

    #[serde(default)]
    pub station_pickup_required: bool,

    #[serde(default)]
    pub station_dropoff_required: bool,

    #[validate(length(max = 500, message = "Emergency reason must be at most 500 characters"))]
    pub emergency_reason: Option<String>,

    #[validate(length(max = 2000, message = "Justification must be at most 2000 characters"))]
    pub emergency_justification: Option<String>,

    pub emergency_amount: Option<Decimal>,

    pub estimated_amount: Option<Decimal>,

    #[validate(length(max = 2000, message = "Advance notes must be at most 2000 characters"))]
    pub advance_notes: Option<String>,

    #[serde(default)]
    pub is_group_travel: bool,

    #[serde(default)]
    pub is_group_captain: bool,

    pub group_size: Option<i32>,

    #[serde(default)]
    pub group_members: Vec<String>,

    #[validate(length(max = 2000, message = "Group description must be at most 2000 characters"))]
    pub group_description: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

fn schema_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_create_travel_request(request: &CreateTravelRequest) -> Result<(), ValidationError> {
    validate_date_range(request.travel_date_from, request.travel_date_to)?;

    match request.request_type {
        RequestType::InValley => {
            return Err(schema_error(
                "request_type",
                "In-valley requests must be filed as valley requests",
            ));
        }
        RequestType::Emergency => {
            if is_blank(&request.emergency_reason) || is_blank(&request.emergency_justification) {
                return Err(schema_error(
                    "emergency_details",
                    "Emergency requests need a reason and a justification",
                ));
            }
        }
        RequestType::Advance => {
            if request.estimated_amount.is_none() {
                return Err(schema_error(
                    "estimated_amount",
                    "Advance requests need an estimated amount",
                ));
            }
        }
        RequestType::Group | RequestType::Normal => {}
    }

    if let Some(amount) = &request.emergency_amount {
        validate_positive_amount(amount)?;
    }
    if let Some(amount) = &request.estimated_amount {
        validate_positive_amount(amount)?;
    }

    if request.request_type == RequestType::Group || request.is_group_travel {
        let size = request.group_size.ok_or_else(|| {
            schema_error("group_size", "Group travel needs the group size")
        })?;
        if !(2..=100).contains(&size) {
            return Err(schema_error("group_size", "Group size must be between 2 and 100"));
        }
        validate_group_members(&request.group_members)?;
        if request.group_members.len() > size as usize {
            return Err(schema_error(
                "group_members",
                "More group members listed than the group size",
            ));
        }
    }

    Ok(())
}

/// Everything the store needs to insert a travel request.
#[derive(Debug, Clone)]
pub struct NewTravelRequest {
    pub employee: EmployeeSnapshot,
    pub details: CreateTravelRequest,
}

/// Request payload for submitting phase-2 expenses on a travel request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_submitted_total"))]
pub struct SubmitExpensesRequest {
    #[validate(
        length(min = 1, max = 100, message = "Submit between 1 and 100 expense items"),
        nested
    )]
    pub expenses: Vec<NewExpenseItem>,

    #[serde(default)]
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub previous_outstanding_advance: Decimal,
}

fn validate_submitted_total(request: &SubmitExpensesRequest) -> Result<(), ValidationError> {
    checked_total(request.expenses.iter().map(|item| &item.amount)).map(|_| ())
}

/// An approver or checker decision carried in a status update body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "approved")]
    Approve,
    #[serde(rename = "rejected")]
    Reject,
}

impl Decision {
    pub fn verb(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }
}

/// Request payload for a status update.
///
/// Any `role` field a client sends is ignored; authority comes from the
/// authenticated user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: Decision,

    #[validate(length(max = 2000, message = "Comments must be at most 2000 characters"))]
    pub comments: Option<String>,

    /// Project whose budget is charged when a checker approves.
    pub project_id: Option<Uuid>,

    #[serde(default)]
    pub include_outstanding_balance: bool,
}

/// A request of either kind, as seen by the workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestRecord {
    Travel(TravelRequest),
    Valley(ValleyRequest),
}

impl RequestRecord {
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestRecord::Travel(_) => RequestKind::Travel,
            RequestRecord::Valley(_) => RequestKind::Valley,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            RequestRecord::Travel(r) => r.id,
            RequestRecord::Valley(r) => r.id,
        }
    }

    pub fn employee_id(&self) -> Uuid {
        match self {
            RequestRecord::Travel(r) => r.employee_id,
            RequestRecord::Valley(r) => r.employee_id,
        }
    }

    pub fn employee_name(&self) -> &str {
        match self {
            RequestRecord::Travel(r) => &r.employee_name,
            RequestRecord::Valley(r) => &r.employee_name,
        }
    }

    pub fn department(&self) -> &str {
        match self {
            RequestRecord::Travel(r) => &r.department,
            RequestRecord::Valley(r) => &r.department,
        }
    }

    pub fn project(&self) -> &str {
        match self {
            RequestRecord::Travel(r) => &r.project,
            RequestRecord::Valley(r) => &r.project,
        }
    }

    pub fn purpose(&self) -> &str {
        match self {
            RequestRecord::Travel(r) => &r.purpose,
            RequestRecord::Valley(r) => &r.purpose,
        }
    }

    pub fn request_type(&self) -> RequestType {
        match self {
            RequestRecord::Travel(r) => r.request_type,
            RequestRecord::Valley(r) => r.request_type,
        }
    }

    pub fn status(&self) -> RequestStatus {
        match self {
            RequestRecord::Travel(r) => r.status,
            RequestRecord::Valley(r) => r.status,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            RequestRecord::Travel(r) => r.phase,
            RequestRecord::Valley(r) => r.phase,
        }
    }

    pub fn total_amount(&self) -> Decimal {
        match self {
            RequestRecord::Travel(r) => r.total_amount,
            RequestRecord::Valley(r) => r.total_amount,
        }
    }

    pub fn previous_outstanding_advance(&self) -> Decimal {
        match self {
            RequestRecord::Travel(r) => r.previous_outstanding_advance,
            RequestRecord::Valley(r) => r.previous_outstanding_advance,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            RequestRecord::Travel(r) => r.created_at,
            RequestRecord::Valley(r) => r.created_at,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            RequestRecord::Travel(r) => r.updated_at,
            RequestRecord::Valley(r) => r.updated_at,
        }
    }
}
