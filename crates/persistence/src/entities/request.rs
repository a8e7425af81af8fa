//! Travel request entity (database row mapping).
//!
//! Most columns are nullable with database defaults. Reading maps `NULL` to
//! the field's default; writing always stores a value, so a record survives
//! a round trip through the row unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Phase, RequestStatus, RequestType, TravelRequest};
use rust_decimal::Decimal;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

/// Database enum for request_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
pub enum RequestStatusDb {
    Pending,
    TravelApproved,
    PendingVerification,
    Approved,
    Rejected,
    RejectedByChecker,
}

impl From<RequestStatusDb> for RequestStatus {
    fn from(status: RequestStatusDb) -> Self {
        match status {
            RequestStatusDb::Pending => RequestStatus::Pending,
            RequestStatusDb::TravelApproved => RequestStatus::TravelApproved,
            RequestStatusDb::PendingVerification => RequestStatus::PendingVerification,
            RequestStatusDb::Approved => RequestStatus::Approved,
            RequestStatusDb::Rejected => RequestStatus::Rejected,
            RequestStatusDb::RejectedByChecker => RequestStatus::RejectedByChecker,
        }
    }
}

impl From<RequestStatus> for RequestStatusDb {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => RequestStatusDb::Pending,
            RequestStatus::TravelApproved => RequestStatusDb::TravelApproved,
            RequestStatus::PendingVerification => RequestStatusDb::PendingVerification,
            RequestStatus::Approved => RequestStatusDb::Approved,
            RequestStatus::Rejected => RequestStatusDb::Rejected,
            RequestStatus::RejectedByChecker => RequestStatusDb::RejectedByChecker,
        }
    }
}

/// Database enum for request_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_type", rename_all = "kebab-case")]
pub enum RequestTypeDb {
    Normal,
    Advance,
    Emergency,
    Group,
    InValley,
}

impl From<RequestTypeDb> for RequestType {
    fn from(request_type: RequestTypeDb) -> Self {
        match request_type {
            RequestTypeDb::Normal => RequestType::Normal,
            RequestTypeDb::Advance => RequestType::Advance,
            RequestTypeDb::Emergency => RequestType::Emergency,
            RequestTypeDb::Group => RequestType::Group,
            RequestTypeDb::InValley => RequestType::InValley,
        }
    }
}

impl From<RequestType> for RequestTypeDb {
    fn from(request_type: RequestType) -> Self {
        match request_type {
            RequestType::Normal => RequestTypeDb::Normal,
            RequestType::Advance => RequestTypeDb::Advance,
            RequestType::Emergency => RequestTypeDb::Emergency,
            RequestType::Group => RequestTypeDb::Group,
            RequestType::InValley => RequestTypeDb::InValley,
        }
    }
}

/// Reads the phase column, falling back to `fallback` for out-of-range values.
pub(crate) fn phase_from_db(id: Uuid, value: i16, fallback: Phase) -> Phase {
    Phase::try_from(value).unwrap_or_else(|e| {
        warn!(request_id = %id, error = %e, "Invalid phase column, using default");
        fallback
    })
}

/// Parses the JSON text stored in `group_members`.
pub(crate) fn group_members_from_db(id: Uuid, raw: Option<&str>) -> Vec<String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Vec::new(),
        Some(json) => serde_json::from_str(json).unwrap_or_else(|e| {
            warn!(request_id = %id, error = %e, "Malformed group_members column, using empty list");
            Vec::new()
        }),
    }
}

/// Serialises group members for the `group_members` column.
pub(crate) fn group_members_to_db(members: &[String]) -> Option<String> {
    serde_json::to_string(members).ok()
}

/// Database row mapping for the travel_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct TravelRequestEntity {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub request_type: RequestTypeDb,
    pub project: Option<String>,
    pub purpose: Option<String>,
    pub location: Option<String>,
    pub travel_date_from: Option<NaiveDate>,
    pub travel_date_to: Option<NaiveDate>,
    pub transport_mode: Option<String>,
    pub station_pickup_required: Option<bool>,
    pub station_dropoff_required: Option<bool>,
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
    pub travel_details_approved_at: Option<DateTime<Utc>>,
    pub expenses_submitted_at: Option<DateTime<Utc>>,
    pub emergency_reason: Option<String>,
    pub emergency_justification: Option<String>,
    pub emergency_amount: Option<Decimal>,
    pub estimated_amount: Option<Decimal>,
    pub advance_notes: Option<String>,
    pub is_group_travel: Option<bool>,
    pub is_group_captain: Option<bool>,
    pub group_size: Option<i32>,
    pub group_members: Option<String>,
    pub group_description: Option<String>,
}

/// Column list shared by every travel request query.
pub(crate) const TRAVEL_REQUEST_COLUMNS: &str = r#"
    id, employee_id, employee_name, department, designation, request_type, project,
    purpose, location, travel_date_from, travel_date_to, transport_mode,
    station_pickup_required, station_dropoff_required, total_amount,
    previous_outstanding_advance, status, phase, approver_id, checker_id,
    approver_comments, checker_comments, created_at, updated_at,
    travel_details_approved_at, expenses_submitted_at, emergency_reason,
    emergency_justification, emergency_amount, estimated_amount, advance_notes,
    is_group_travel, is_group_captain, group_size, group_members, group_description
"#;

impl From<TravelRequestEntity> for TravelRequest {
    fn from(entity: TravelRequestEntity) -> Self {
        let now = Utc::now();
        let today = now.date_naive();
        let id = entity.id;
        Self {
            id,
            employee_id: entity.employee_id,
            employee_name: entity.employee_name.unwrap_or_default(),
            department: entity.department.unwrap_or_default(),
            designation: entity.designation.unwrap_or_default(),
            request_type: entity.request_type.into(),
            project: entity.project.unwrap_or_default(),
            purpose: entity.purpose.unwrap_or_default(),
            location: entity.location.unwrap_or_default(),
            travel_date_from: entity.travel_date_from.unwrap_or(today),
            travel_date_to: entity.travel_date_to.unwrap_or(today),
            transport_mode: entity.transport_mode.unwrap_or_default(),
            station_pickup_required: entity.station_pickup_required.unwrap_or_default(),
            station_dropoff_required: entity.station_dropoff_required.unwrap_or_default(),
            total_amount: entity.total_amount.unwrap_or_default(),
            previous_outstanding_advance: entity
                .previous_outstanding_advance
                .unwrap_or_default(),
            status: entity.status.into(),
            phase: phase_from_db(id, entity.phase, Phase::TravelDetails),
            approver_id: entity.approver_id,
            checker_id: entity.checker_id,
            approver_comments: entity.approver_comments.unwrap_or_default(),
            checker_comments: entity.checker_comments.unwrap_or_default(),
            created_at: entity.created_at.unwrap_or(now),
            updated_at: entity.updated_at.unwrap_or(now),
            travel_details_approved_at: entity.travel_details_approved_at,
            expenses_submitted_at: entity.expenses_submitted_at,
            emergency_reason: entity.emergency_reason,
            emergency_justification: entity.emergency_justification,
            emergency_amount: entity.emergency_amount,
            estimated_amount: entity.estimated_amount,
            advance_notes: entity.advance_notes,
            is_group_travel: entity.is_group_travel.unwrap_or_default(),
            is_group_captain: entity.is_group_captain.unwrap_or_default(),
            group_size: entity.group_size,
            group_members: group_members_from_db(id, entity.group_members.as_deref()),
            group_description: entity.group_description,
        }
    }
}

impl From<&TravelRequest> for TravelRequestEntity {
    fn from(request: &TravelRequest) -> Self {
        Self {
            id: request.id,
            employee_id: request.employee_id,
            employee_name: Some(request.employee_name.clone()),
            department: Some(request.department.clone()),
            designation: Some(request.designation.clone()),
            request_type: request.request_type.into(),
            project: Some(request.project.clone()),
            purpose: Some(request.purpose.clone()),
            location: Some(request.location.clone()),
            travel_date_from: Some(request.travel_date_from),
            travel_date_to: Some(request.travel_date_to),
            transport_mode: Some(request.transport_mode.clone()),
            station_pickup_required: Some(request.station_pickup_required),
            station_dropoff_required: Some(request.station_dropoff_required),
            total_amount: Some(request.total_amount),
            previous_outstanding_advance: Some(request.previous_outstanding_advance),
            status: request.status.into(),
            phase: request.phase.into(),
            approver_id: request.approver_id,
            checker_id: request.checker_id,
            approver_comments: Some(request.approver_comments.clone()),
            checker_comments: Some(request.checker_comments.clone()),
            created_at: Some(request.created_at),
            updated_at: Some(request.updated_at),
            travel_details_approved_at: request.travel_details_approved_at,
            expenses_submitted_at: request.expenses_submitted_at,
            emergency_reason: request.emergency_reason.clone(),
            emergency_justification: request.emergency_justification.clone(),
            emergency_amount: request.emergency_amount,
            estimated_amount: request.estimated_amount,
            advance_notes: request.advance_notes.clone(),
            is_group_travel: Some(request.is_group_travel),
            is_group_captain: Some(request.is_group_captain),
            group_size: request.group_size,
            group_members: group_members_to_db(&request.group_members),
            group_description: request.group_description.clone(),
        }
    }
}
