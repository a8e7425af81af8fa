//! Request status transition table.
//!
//! The next status is always derived here from the request kind, its current
//! status, the caller's server-side role and the decision. Clients only ever
//! say "approve" or "reject".

use crate::errors::WorkflowError;
use crate::models::{Decision, RequestKind, RequestStatus, UserRole};

/// Which review step a decision belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStage {
    Approver,
    Checker,
}

impl ReviewStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStage::Approver => "approver",
            ReviewStage::Checker => "checker",
        }
    }

    fn permits(&self, role: UserRole) -> bool {
        match self {
            ReviewStage::Approver => matches!(role, UserRole::Approver | UserRole::Admin),
            ReviewStage::Checker => matches!(role, UserRole::Checker | UserRole::Admin),
        }
    }
}

/// An allowed move through the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub stage: ReviewStage,
    pub from: RequestStatus,
    pub next: RequestStatus,
    pub deducts_budget: bool,
}

/// Returns the review stage a request in `status` is waiting on, if any.
pub fn pending_stage(status: RequestStatus) -> Option<ReviewStage> {
    match status {
        RequestStatus::Pending => Some(ReviewStage::Approver),
        RequestStatus::PendingVerification => Some(ReviewStage::Checker),
        _ => None,
    }
}

/// Resolves a reviewer decision into a transition.
///
/// `is_own_request` is true when the caller filed the request; nobody
/// reviews their own request.
pub fn decide(
    kind: RequestKind,
    current: RequestStatus,
    role: UserRole,
    decision: Decision,
    is_own_request: bool,
) -> Result<Transition, WorkflowError> {
    if role == UserRole::Employee {
        return Err(WorkflowError::Forbidden(
            "employees cannot review requests".to_string(),
        ));
    }

    let stage = pending_stage(current).ok_or(WorkflowError::InvalidTransition {
        from: current,
        action: decision.verb(),
    })?;

    if !stage.permits(role) {
        return Err(WorkflowError::Forbidden(format!(
            "a {} cannot act at the {} stage",
            role,
            stage.as_str()
        )));
    }

    if is_own_request {
        return Err(WorkflowError::Forbidden(
            "cannot review your own request".to_string(),
        ));
    }

    let next = match (stage, decision, kind) {
        (ReviewStage::Approver, Decision::Approve, RequestKind::Travel) => {
            RequestStatus::TravelApproved
        }
        (ReviewStage::Approver, Decision::Approve, RequestKind::Valley) => {
            RequestStatus::PendingVerification
        }
        (ReviewStage::Approver, Decision::Reject, _) => RequestStatus::Rejected,
        (ReviewStage::Checker, Decision::Approve, _) => RequestStatus::Approved,
        (ReviewStage::Checker, Decision::Reject, _) => RequestStatus::RejectedByChecker,
    };

    Ok(Transition {
        stage,
        from: current,
        next,
        deducts_budget: next == RequestStatus::Approved,
    })
}

/// Checks that the owner may submit phase-2 expenses on a travel request.
pub fn ensure_can_submit_expenses(
    current: RequestStatus,
    is_owner: bool,
) -> Result<(), WorkflowError> {
    if !is_owner {
        return Err(WorkflowError::Forbidden(
            "only the employee who filed the request can submit expenses".to_string(),
        ));
    }
    if current != RequestStatus::TravelApproved {
        return Err(WorkflowError::InvalidTransition {
            from: current,
            action: "submit expenses for",
        });
    }
    Ok(())
}

/// Status in which single expense items may still be added to a request.
pub fn entry_status(kind: RequestKind) -> RequestStatus {
    match kind {
        RequestKind::Travel => RequestStatus::TravelApproved,
        RequestKind::Valley => RequestStatus::Pending,
    }
}

/// Whether `role` may delete a request in `status` that `is_owner` filed.
pub fn can_delete(role: UserRole, status: RequestStatus, is_owner: bool) -> bool {
    role == UserRole::Admin || (is_owner && status == RequestStatus::Pending)
}
