//! Best-effort notification fan-out.
//!
//! Notifications are rows in the store, one per recipient. Fan-out never
//! fails the operation that triggered it: each failed insert is logged and
//! counted in the returned [`FanOutReport`].

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{Decision, RequestKind, RequestStatus};

/// Storage port that records one notification.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(
        &self,
        user_id: Uuid,
        request_id: Option<Uuid>,
        message: &str,
    ) -> Result<(), StoreError>;
}

/// Counts from one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub delivered: usize,
    pub failed: usize,
}

impl FanOutReport {
    pub fn merge(self, other: FanOutReport) -> FanOutReport {
        FanOutReport {
            delivered: self.delivered + other.delivered,
            failed: self.failed + other.failed,
        }
    }
}

/// Writes `message` to every recipient, one insert each.
pub async fn fan_out<S>(
    sink: &S,
    recipients: &[Uuid],
    request_id: Option<Uuid>,
    message: &str,
) -> FanOutReport
where
    S: NotificationSink + ?Sized,
{
    let mut report = FanOutReport::default();
    for &user_id in recipients {
        match sink.notify(user_id, request_id, message).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                report.failed += 1;
                warn!(
                    user_id = %user_id,
                    request_id = ?request_id,
                    error = %e,
                    "Failed to record notification"
                );
            }
        }
    }
    debug!(
        delivered = report.delivered,
        failed = report.failed,
        "Notification fan-out finished"
    );
    report
}

/// Message sent to the employee when their request is filed.
pub fn submitted_message(kind: RequestKind, purpose: &str) -> String {
    format!("Your {} \"{}\" has been submitted for approval.", kind.label(), purpose)
}

/// Message sent to reviewers when a request is waiting on them.
pub fn review_needed_message(kind: RequestKind, employee_name: &str, purpose: &str) -> String {
    format!(
        "A {} from {} (\"{}\") is waiting for your review.",
        kind.label(),
        employee_name,
        purpose
    )
}

/// Message sent to the employee after a review decision.
pub fn decision_message(
    kind: RequestKind,
    purpose: &str,
    next: RequestStatus,
    decision: Decision,
    comments: Option<&str>,
) -> String {
    let outcome = match (next, decision) {
        (RequestStatus::TravelApproved, _) => {
            "has been approved. You can now submit your expenses".to_string()
        }
        (RequestStatus::PendingVerification, _) => {
            "has been approved and sent to finance for verification".to_string()
        }
        (RequestStatus::Approved, _) => "has been verified and approved by finance".to_string(),
        (RequestStatus::RejectedByChecker, _) => "has been rejected by finance".to_string(),
        (_, Decision::Reject) => "has been rejected".to_string(),
        (status, Decision::Approve) => format!("is now {}", status),
    };

    match comments.map(str::trim).filter(|c| !c.is_empty()) {
        Some(comments) => format!(
            "Your {} \"{}\" {}. Comments: {}",
            kind.label(),
            purpose,
            outcome,
            comments
        ),
        None => format!("Your {} \"{}\" {}.", kind.label(), purpose, outcome),
    }
}

/// Message sent to the employee once travel expenses are submitted.
pub fn expenses_submitted_message(purpose: &str) -> String {
    format!(
        "Expenses for your travel request \"{}\" have been submitted for verification.",
        purpose
    )
}

/// Recording sink for development and testing.
///
/// Keeps every delivered notification in memory and fails for the users
/// listed in `failing_users`.
#[derive(Debug, Default)]
pub struct MockNotificationSink {
    delivered: Mutex<Vec<(Uuid, Option<Uuid>, String)>>,
    failing_users: HashSet<Uuid>,
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects inserts for the given users.
    pub fn failing_for(users: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failing_users: users.into_iter().collect(),
        }
    }

    /// Notifications recorded so far as `(user_id, request_id, message)`.
    pub fn delivered(&self) -> Vec<(Uuid, Option<Uuid>, String)> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn count_for(&self, user_id: Uuid) -> usize {
        self.delivered()
            .iter()
            .filter(|(recipient, _, _)| *recipient == user_id)
            .count()
    }
}

#[async_trait]
impl NotificationSink for MockNotificationSink {
    async fn notify(
        &self,
        user_id: Uuid,
        request_id: Option<Uuid>,
        message: &str,
    ) -> Result<(), StoreError> {
        if self.failing_users.contains(&user_id) {
            warn!(user_id = %user_id, "Mock notification sink simulating failure");
            return Err(StoreError::Unavailable("simulated failure".to_string()));
        }
        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push((user_id, request_id, message.to_string()));
        }
        Ok(())
    }
}
