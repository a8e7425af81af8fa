//! Admin statistics over requests, users and budgets.

use rust_decimal::Decimal;

use crate::models::{AdminStats, Budget, RequestKind, RequestRecord, RequestStatus, User};

fn bump(map: &mut std::collections::BTreeMap<String, usize>, key: &str) {
    let key = if key.trim().is_empty() { "unassigned" } else { key };
    *map.entry(key.to_string()).or_insert(0) += 1;
}

/// Aggregates travel and valley requests together.
///
/// `budgets` should hold the current row per project; `remaining_budget` is
/// their sum.
pub fn compute(records: &[RequestRecord], users: &[User], budgets: &[Budget]) -> AdminStats {
    let mut stats = AdminStats {
        total_requests: records.len(),
        total_users: users.len(),
        ..Default::default()
    };

    for record in records {
        match record.kind() {
            RequestKind::Travel => stats.travel_requests += 1,
            RequestKind::Valley => stats.valley_requests += 1,
        }
        bump(&mut stats.by_status, record.status().as_str());
        bump(&mut stats.by_request_type, record.request_type().as_str());
        bump(&mut stats.by_department, record.department());
        bump(&mut stats.by_project, record.project());

        if record.status() == RequestStatus::Approved {
            stats.approved_amount += record.total_amount();
        }
    }

    for user in users {
        bump(&mut stats.users_by_role, user.role.as_str());
    }

    stats.remaining_budget = budgets.iter().map(|b| b.amount).sum::<Decimal>();
    stats
}
