//! Budget deduction on checker approval.
//!
//! Budgets are shared between concurrent approvals, so every amount change
//! is a compare-and-set on the budget's `version`. A lost race re-reads the
//! row and re-checks the balance before trying again.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{StoreError, WorkflowError};
use crate::models::{Budget, Project};

/// Default number of compare-and-set attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Storage port for projects and budgets.
#[async_trait]
pub trait BudgetLedger: Send + Sync {
    async fn find_project(&self, project_id: Uuid) -> Result<Option<Project>, StoreError>;

    /// Latest budget row allocated to a project.
    async fn current_budget(&self, project_id: Uuid) -> Result<Option<Budget>, StoreError>;

    async fn find_budget(&self, budget_id: Uuid) -> Result<Option<Budget>, StoreError>;

    /// Sets the amount only if the row is still at `expected_version`.
    /// Returns false when another writer got there first.
    async fn compare_and_set(
        &self,
        budget_id: Uuid,
        expected_version: i64,
        new_amount: Decimal,
    ) -> Result<bool, StoreError>;
}

/// Amount charged for an approval.
pub fn expense_amount(
    total_amount: Decimal,
    previous_outstanding_advance: Decimal,
    include_outstanding_balance: bool,
) -> Decimal {
    if include_outstanding_balance {
        total_amount + previous_outstanding_advance
    } else {
        total_amount
    }
}

/// Budget remaining after a deduction, floored at zero.
pub fn deducted_amount(budget_amount: Decimal, expense: Decimal) -> Decimal {
    (budget_amount - expense).max(Decimal::ZERO)
}

pub fn has_enough_budget(budget_amount: Decimal, expense: Decimal) -> bool {
    budget_amount >= expense
}

/// Outcome of a successful deduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetDeduction {
    pub budget_id: Uuid,
    pub project_id: Uuid,
    pub charged: Decimal,
    pub previous_amount: Decimal,
    pub new_amount: Decimal,
    pub attempts: u32,
}

async fn active_budget<L>(ledger: &L, project_id: Uuid) -> Result<Budget, WorkflowError>
where
    L: BudgetLedger + ?Sized,
{
    let project = ledger
        .find_project(project_id)
        .await?
        .ok_or_else(|| WorkflowError::Validation(format!("project {} does not exist", project_id)))?;

    if !project.active {
        return Err(WorkflowError::Validation(format!(
            "project {} is not active",
            project.name
        )));
    }

    ledger.current_budget(project_id).await?.ok_or_else(|| {
        WorkflowError::Validation(format!("project {} has no budget allocated", project.name))
    })
}

/// Charges `expense` to the project's current budget.
pub async fn deduct<L>(
    ledger: &L,
    project_id: Uuid,
    expense: Decimal,
    max_attempts: u32,
) -> Result<BudgetDeduction, WorkflowError>
where
    L: BudgetLedger + ?Sized,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let budget = active_budget(ledger, project_id).await?;

        if !has_enough_budget(budget.amount, expense) {
            return Err(WorkflowError::InsufficientBudget {
                available: budget.amount,
                required: expense,
            });
        }

        let new_amount = deducted_amount(budget.amount, expense);
        if ledger
            .compare_and_set(budget.id, budget.version, new_amount)
            .await?
        {
            info!(
                project_id = %project_id,
                budget_id = %budget.id,
                charged = %expense,
                previous_amount = %budget.amount,
                new_amount = %new_amount,
                attempt,
                "Budget deducted"
            );
            return Ok(BudgetDeduction {
                budget_id: budget.id,
                project_id,
                charged: expense,
                previous_amount: budget.amount,
                new_amount,
                attempts: attempt,
            });
        }

        debug!(
            budget_id = %budget.id,
            version = budget.version,
            attempt,
            "Budget changed underneath deduction, retrying"
        );
    }

    warn!(
        project_id = %project_id,
        attempts = max_attempts,
        "Budget deduction gave up after repeated conflicts"
    );
    Err(WorkflowError::BudgetContention)
}

/// Returns a previous deduction to its budget row.
pub async fn credit<L>(
    ledger: &L,
    deduction: &BudgetDeduction,
    max_attempts: u32,
) -> Result<Decimal, WorkflowError>
where
    L: BudgetLedger + ?Sized,
{
    for _ in 0..max_attempts.max(1) {
        let budget = ledger
            .find_budget(deduction.budget_id)
            .await?
            .ok_or(WorkflowError::Store(StoreError::NotFound))?;

        let restored = budget.amount + deduction.charged;
        if ledger
            .compare_and_set(budget.id, budget.version, restored)
            .await?
        {
            info!(
                budget_id = %budget.id,
                credited = %deduction.charged,
                new_amount = %restored,
                "Budget deduction reversed"
            );
            return Ok(restored);
        }
    }
    Err(WorkflowError::BudgetContention)
}

/// In-memory ledger used by workflow tests.
#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryLedger {
        pub projects: Mutex<HashMap<Uuid, Project>>,
        pub budgets: Mutex<HashMap<Uuid, Budget>>,
    }

    impl MemoryLedger {
        /// Creates a ledger holding one active project with one budget row.
        pub fn with_budget(amount: Decimal) -> (Self, Uuid) {
            let ledger = Self::default();
            let project_id = ledger.add_project(true);
            ledger.add_budget(project_id, amount);
            (ledger, project_id)
        }

        pub fn add_project(&self, active: bool) -> Uuid {
            let project = Project {
                id: Uuid::new_v4(),
                name: "Rural Health Outreach".to_string(),
                description: String::new(),
                active,
                created_at: Utc::now(),
            };
            let id = project.id;
            self.projects.lock().unwrap().insert(id, project);
            id
        }

        pub fn add_budget(&self, project_id: Uuid, amount: Decimal) -> Uuid {
            let budget = Budget {
                id: Uuid::new_v4(),
                project_id,
                amount,
                fiscal_year: "2024/25".to_string(),
                description: String::new(),
                version: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let id = budget.id;
            self.budgets.lock().unwrap().insert(id, budget);
            id
        }

        pub fn amount_for(&self, project_id: Uuid) -> Decimal {
            self.budgets
                .lock()
                .unwrap()
                .values()
                .find(|b| b.project_id == project_id)
                .map(|b| b.amount)
                .unwrap()
        }
    }

    #[async_trait]
    impl BudgetLedger for MemoryLedger {
        async fn find_project(&self, project_id: Uuid) -> Result<Option<Project>, StoreError> {
            Ok(self.projects.lock().unwrap().get(&project_id).cloned())
        }

        async fn current_budget(&self, project_id: Uuid) -> Result<Option<Budget>, StoreError> {
            let budget = self
                .budgets
                .lock()
                .unwrap()
                .values()
                .filter(|b| b.project_id == project_id)
                .max_by_key(|b| b.created_at)
                .cloned();
            // Let a concurrent caller read the same version before we write.
            tokio::task::yield_now().await;
            Ok(budget)
        }

        async fn find_budget(&self, budget_id: Uuid) -> Result<Option<Budget>, StoreError> {
            Ok(self.budgets.lock().unwrap().get(&budget_id).cloned())
        }

        async fn compare_and_set(
            &self,
            budget_id: Uuid,
            expected_version: i64,
            new_amount: Decimal,
        ) -> Result<bool, StoreError> {
            let mut budgets = self.budgets.lock().unwrap();
            let budget = budgets.get_mut(&budget_id).ok_or(StoreError::NotFound)?;
            if budget.version != expected_version {
                return Ok(false);
            }
            budget.amount = new_amount;
            budget.version += 1;
            budget.updated_at = Utc::now();
            Ok(true)
        }
    }
}
