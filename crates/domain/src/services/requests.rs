//! Request lifecycle orchestration over storage ports.
//!
//! [`RequestWorkflow`] ties the transition table, budget deduction and
//! notification fan-out together. It holds no state of its own; the API
//! builds one per call from the repositories it already has.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::{StoreError, WorkflowError};
use crate::models::{
    Actor, CreateTravelRequest, CreateValleyRequest, EmployeeSnapshot, ExpenseItem,
    NewExpenseItem, NewTravelRequest, NewValleyRequest, RequestKind, RequestRecord,
    RequestStatus, StatusUpdateRequest, SubmitExpensesRequest, TravelRequest, UserRole,
    ValleyRequest,
};
use crate::services::budget::{self, BudgetDeduction, BudgetLedger, DEFAULT_MAX_ATTEMPTS};
use crate::services::notification::{self, fan_out, FanOutReport, NotificationSink};
use crate::services::workflow::{self, ReviewStage};

/// A reviewer decision ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub next: RequestStatus,
    pub stage: ReviewStage,
    pub reviewer_id: Uuid,
    pub comments: String,
}

/// Storage port for travel and valley requests.
///
/// Every write that depends on the current status takes the status the
/// caller last read and returns `Ok(None)` when the row has moved on.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn create_travel(&self, new: NewTravelRequest) -> Result<TravelRequest, StoreError>;

    /// Inserts a valley request together with its items.
    async fn create_valley(&self, new: NewValleyRequest) -> Result<ValleyRequest, StoreError>;

    async fn find(&self, kind: RequestKind, id: Uuid)
        -> Result<Option<RequestRecord>, StoreError>;

    async fn apply_decision(
        &self,
        kind: RequestKind,
        id: Uuid,
        expected: RequestStatus,
        change: &StatusChange,
    ) -> Result<Option<RequestRecord>, StoreError>;

    /// Inserts the items, recomputes the total and moves the travel request
    /// to `pending_verification` in phase 2.
    async fn submit_expenses(
        &self,
        id: Uuid,
        expected: RequestStatus,
        submission: &SubmitExpensesRequest,
    ) -> Result<Option<TravelRequest>, StoreError>;

    /// Adds one item while the request is still in `expected`.
    async fn add_item(
        &self,
        kind: RequestKind,
        request_id: Uuid,
        expected: RequestStatus,
        item: &NewExpenseItem,
    ) -> Result<Option<ExpenseItem>, StoreError>;

    async fn delete(&self, kind: RequestKind, id: Uuid) -> Result<bool, StoreError>;
}

/// Lookup of notification recipients by role.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_ids_with_role(&self, role: UserRole) -> Result<Vec<Uuid>, StoreError>;
}

/// A completed workflow step and the notifications it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowOutcome<T> {
    pub record: T,
    pub notifications: FanOutReport,
    pub deduction: Option<BudgetDeduction>,
}

impl<T> WorkflowOutcome<T> {
    fn new(record: T, notifications: FanOutReport) -> Self {
        Self {
            record,
            notifications,
            deduction: None,
        }
    }
}

/// Drives requests through their lifecycle.
pub struct RequestWorkflow<'a> {
    store: &'a dyn RequestStore,
    users: &'a dyn UserDirectory,
    ledger: &'a dyn BudgetLedger,
    notifications: &'a dyn NotificationSink,
    budget_max_retries: u32,
}

impl<'a> RequestWorkflow<'a> {
    pub fn new(
        store: &'a dyn RequestStore,
        users: &'a dyn UserDirectory,
        ledger: &'a dyn BudgetLedger,
        notifications: &'a dyn NotificationSink,
    ) -> Self {
        Self {
            store,
            users,
            ledger,
            notifications,
            budget_max_retries: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_budget_retries(mut self, retries: u32) -> Self {
        self.budget_max_retries = retries.max(1);
        self
    }

    /// Files a travel request for the caller in `pending`, phase 1.
    pub async fn submit_travel(
        &self,
        actor: &Actor,
        details: CreateTravelRequest,
    ) -> Result<WorkflowOutcome<TravelRequest>, WorkflowError> {
        let request = self
            .store
            .create_travel(NewTravelRequest {
                employee: snapshot(actor),
                details,
            })
            .await?;

        info!(
            request_id = %request.id,
            user_id = %actor.user_id,
            request_type = %request.request_type,
            "Travel request created"
        );

        let report = self
            .announce_new(RequestKind::Travel, request.id, actor, &request.purpose)
            .await;
        Ok(WorkflowOutcome::new(request, report))
    }

    /// Files a valley request with its items in `pending`, phase 2.
    pub async fn submit_valley(
        &self,
        actor: &Actor,
        details: CreateValleyRequest,
    ) -> Result<WorkflowOutcome<ValleyRequest>, WorkflowError> {
        let total_amount = details
            .total_amount()
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;

        let request = self
            .store
            .create_valley(NewValleyRequest {
                employee: snapshot(actor),
                details,
                total_amount,
            })
            .await?;

        info!(
            request_id = %request.id,
            user_id = %actor.user_id,
            total_amount = %request.total_amount,
            "Valley request created"
        );

        let report = self
            .announce_new(RequestKind::Valley, request.id, actor, &request.purpose)
            .await;
        Ok(WorkflowOutcome::new(request, report))
    }

    /// Applies an approver or checker decision.
    ///
    /// A checker approval with a project charges the budget first; if the
    /// status write then loses to a concurrent decision the charge is
    /// credited back and the caller gets [`WorkflowError::Conflict`].
    pub async fn decide(
        &self,
        actor: &Actor,
        kind: RequestKind,
        id: Uuid,
        update: &StatusUpdateRequest,
    ) -> Result<WorkflowOutcome<RequestRecord>, WorkflowError> {
        let record = self
            .store
            .find(kind, id)
            .await?
            .ok_or(WorkflowError::NotFound)?;

        let transition = workflow::decide(
            kind,
            record.status(),
            actor.role,
            update.status,
            record.employee_id() == actor.user_id,
        )?;

        let deduction = if transition.deducts_budget {
            self.charge_budget(&record, update).await?
        } else {
            None
        };

        let change = StatusChange {
            next: transition.next,
            stage: transition.stage,
            reviewer_id: actor.user_id,
            comments: update.comments.clone().unwrap_or_default(),
        };

        let written = self
            .store
            .apply_decision(kind, id, transition.from, &change)
            .await;

        let updated = match written {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                warn!(
                    request_id = %id,
                    expected_status = %transition.from,
                    "Request changed before decision was written"
                );
                self.reverse(deduction.as_ref()).await;
                return Err(WorkflowError::Conflict);
            }
            Err(e) => {
                self.reverse(deduction.as_ref()).await;
                return Err(e.into());
            }
        };

        info!(
            request_id = %id,
            user_id = %actor.user_id,
            kind = %kind,
            from = %transition.from,
            status = %updated.status(),
            "Request status updated"
        );

        let mut report = fan_out(
            self.notifications,
            &[updated.employee_id()],
            Some(id),
            &notification::decision_message(
                kind,
                updated.purpose(),
                transition.next,
                update.status,
                update.comments.as_deref(),
            ),
        )
        .await;

        if transition.next == RequestStatus::PendingVerification {
            report = report.merge(self.notify_checkers(&updated).await);
        }

        Ok(WorkflowOutcome {
            record: updated,
            notifications: report,
            deduction,
        })
    }

    /// Submits phase-2 expenses on an approved travel request.
    pub async fn submit_travel_expenses(
        &self,
        actor: &Actor,
        id: Uuid,
        submission: &SubmitExpensesRequest,
    ) -> Result<WorkflowOutcome<TravelRequest>, WorkflowError> {
        let record = self
            .store
            .find(RequestKind::Travel, id)
            .await?
            .ok_or(WorkflowError::NotFound)?;

        workflow::ensure_can_submit_expenses(record.status(), record.employee_id() == actor.user_id)?;

        let updated = self
            .store
            .submit_expenses(id, record.status(), submission)
            .await?
            .ok_or(WorkflowError::Conflict)?;

        info!(
            request_id = %id,
            user_id = %actor.user_id,
            items = submission.expenses.len(),
            total_amount = %updated.total_amount,
            "Travel expenses submitted"
        );

        let report = fan_out(
            self.notifications,
            &[updated.employee_id],
            Some(id),
            &notification::expenses_submitted_message(&updated.purpose),
        )
        .await
        .merge(
            self.notify_checkers(&RequestRecord::Travel(updated.clone()))
                .await,
        );

        Ok(WorkflowOutcome::new(updated, report))
    }

    /// Adds a single expense item while the request is still open for entry.
    pub async fn add_expense_item(
        &self,
        actor: &Actor,
        kind: RequestKind,
        request_id: Uuid,
        item: &NewExpenseItem,
    ) -> Result<ExpenseItem, WorkflowError> {
        let record = self
            .store
            .find(kind, request_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;

        if record.employee_id() != actor.user_id {
            return Err(WorkflowError::Forbidden(
                "only the employee who filed the request can add expenses".to_string(),
            ));
        }

        let expected = workflow::entry_status(kind);
        if record.status() != expected {
            return Err(WorkflowError::InvalidTransition {
                from: record.status(),
                action: "add expenses to",
            });
        }

        let created = self
            .store
            .add_item(kind, request_id, expected, item)
            .await?
            .ok_or(WorkflowError::Conflict)?;

        info!(
            request_id = %request_id,
            item_id = %created.id,
            amount = %created.amount,
            "Expense item added"
        );
        Ok(created)
    }

    /// Deletes a request: owners while it is pending, admins at any time.
    pub async fn delete(
        &self,
        actor: &Actor,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<(), WorkflowError> {
        let record = self
            .store
            .find(kind, id)
            .await?
            .ok_or(WorkflowError::NotFound)?;

        if !workflow::can_delete(
            actor.role,
            record.status(),
            record.employee_id() == actor.user_id,
        ) {
            return Err(WorkflowError::Forbidden(format!(
                "cannot delete a request in status {}",
                record.status()
            )));
        }

        if !self.store.delete(kind, id).await? {
            return Err(WorkflowError::NotFound);
        }

        info!(request_id = %id, user_id = %actor.user_id, kind = %kind, "Request deleted");
        Ok(())
    }

    async fn charge_budget(
        &self,
        record: &RequestRecord,
        update: &StatusUpdateRequest,
    ) -> Result<Option<BudgetDeduction>, WorkflowError> {
        let Some(project_id) = update.project_id else {
            warn!(
                request_id = %record.id(),
                "Checker approval without a project, no budget deducted"
            );
            return Ok(None);
        };

        let expense: Decimal = budget::expense_amount(
            record.total_amount(),
            record.previous_outstanding_advance(),
            update.include_outstanding_balance,
        );
        let deduction =
            budget::deduct(self.ledger, project_id, expense, self.budget_max_retries).await?;
        Ok(Some(deduction))
    }

    async fn reverse(&self, deduction: Option<&BudgetDeduction>) {
        let Some(deduction) = deduction else {
            return;
        };
        if let Err(e) = budget::credit(self.ledger, deduction, self.budget_max_retries).await {
            error!(
                budget_id = %deduction.budget_id,
                amount = %deduction.charged,
                error = %e,
                "Failed to reverse budget deduction"
            );
        }
    }

    async fn announce_new(
        &self,
        kind: RequestKind,
        request_id: Uuid,
        actor: &Actor,
        purpose: &str,
    ) -> FanOutReport {
        let employee = fan_out(
            self.notifications,
            &[actor.user_id],
            Some(request_id),
            &notification::submitted_message(kind, purpose),
        )
        .await;

        let approvers = self.recipients(UserRole::Approver).await;
        let reviewers = fan_out(
            self.notifications,
            &approvers,
            Some(request_id),
            &notification::review_needed_message(kind, &actor.name, purpose),
        )
        .await;

        employee.merge(reviewers)
    }

    async fn notify_checkers(&self, record: &RequestRecord) -> FanOutReport {
        let checkers = self.recipients(UserRole::Checker).await;
        fan_out(
            self.notifications,
            &checkers,
            Some(record.id()),
            &notification::review_needed_message(
                record.kind(),
                record.employee_name(),
                record.purpose(),
            ),
        )
        .await
    }

    async fn recipients(&self, role: UserRole) -> Vec<Uuid> {
        match self.users.user_ids_with_role(role).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(role = %role, error = %e, "Could not load notification recipients");
                Vec::new()
            }
        }
    }
}

fn snapshot(actor: &Actor) -> EmployeeSnapshot {
    EmployeeSnapshot {
        id: actor.user_id,
        name: actor.name.clone(),
        department: actor.department.clone(),
        designation: actor.designation.clone(),
    }
}
