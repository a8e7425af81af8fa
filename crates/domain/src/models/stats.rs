//! Admin reporting models.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate counts over every travel and valley request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_requests: usize,
    pub travel_requests: usize,
    pub valley_requests: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_request_type: BTreeMap<String, usize>,
    pub by_department: BTreeMap<String, usize>,
    pub by_project: BTreeMap<String, usize>,
    pub users_by_role: BTreeMap<String, usize>,
    pub total_users: usize,
    pub approved_amount: Decimal,
    pub remaining_budget: Decimal,
}
