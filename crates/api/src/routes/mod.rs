//! HTTP route handlers.

pub mod admin;
pub mod admin_users;
pub mod auth;
pub mod expenses;
pub mod health;
pub mod notifications;
pub mod projects;
pub mod receipts;
pub mod requests;
pub mod valley_requests;

use domain::models::RequestKind;
use domain::services::{RequestWorkflow, WorkflowOutcome};
use persistence::ports::{PgBudgetLedger, PgRequestStore};
use persistence::repositories::{NotificationRepository, UserRepository};

use crate::app::AppState;
use crate::middleware::metrics::{record_budget_deduction, record_notification_failures};

/// Postgres-backed ports for one request's worth of workflow calls.
pub(crate) struct Gateways {
    pub store: PgRequestStore,
    users: UserRepository,
    ledger: PgBudgetLedger,
    notifications: NotificationRepository,
    budget_max_retries: u32,
}

impl Gateways {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: PgRequestStore::new(state.pool.clone()),
            users: UserRepository::new(state.pool.clone()),
            ledger: PgBudgetLedger::new(state.pool.clone()),
            notifications: NotificationRepository::new(state.pool.clone()),
            budget_max_retries: state.config.workflow.budget_max_retries,
        }
    }

    pub fn workflow(&self) -> RequestWorkflow<'_> {
        RequestWorkflow::new(&self.store, &self.users, &self.ledger, &self.notifications)
            .with_budget_retries(self.budget_max_retries)
    }
}

/// Feeds the side effects of a workflow step into the metrics recorder.
pub(crate) fn record_outcome<T>(outcome: &WorkflowOutcome<T>) {
    record_notification_failures(outcome.notifications.failed);
    if let Some(deduction) = &outcome.deduction {
        record_budget_deduction(deduction.attempts);
    }
}

/// Parses the `kind` query/form value used by the receipt endpoints.
pub(crate) fn parse_kind(value: &str) -> Option<RequestKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "travel" => Some(RequestKind::Travel),
        "valley" => Some(RequestKind::Valley),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("travel"), Some(RequestKind::Travel));
        assert_eq!(parse_kind(" Valley "), Some(RequestKind::Valley));
        assert_eq!(parse_kind("expense"), None);
    }
}
