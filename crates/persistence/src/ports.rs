//! PostgreSQL implementations of the domain storage ports.

use async_trait::async_trait;
use domain::errors::StoreError;
use domain::models::{
    Budget, ExpenseItem, NewExpenseItem, NewTravelRequest, NewValleyRequest, Project,
    RequestKind, RequestRecord, RequestStatus, SubmitExpensesRequest, TravelRequest, UserRole,
    ValleyRequest,
};
use domain::services::{BudgetLedger, NotificationSink, RequestStore, StatusChange, UserDirectory};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repositories::{
    BudgetRepository, ExpenseRepository, NotificationRepository, ProjectRepository,
    TravelRequestRepository, UserRepository, ValleyRequestRepository,
};

/// Request store over the travel, valley and expense item tables.
#[derive(Clone)]
pub struct PgRequestStore {
    travel: TravelRequestRepository,
    valley: ValleyRequestRepository,
    expenses: ExpenseRepository,
}

impl PgRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            travel: TravelRequestRepository::new(pool.clone()),
            valley: ValleyRequestRepository::new(pool.clone()),
            expenses: ExpenseRepository::new(pool),
        }
    }

    /// Every request of both kinds, optionally restricted to one employee.
    pub async fn find_all(&self, employee_id: Option<Uuid>) -> Result<Vec<RequestRecord>, StoreError> {
        let (travel, valley) = match employee_id {
            Some(id) => (
                self.travel.find_by_employee_id(id).await?,
                self.valley.find_by_employee_id(id).await?,
            ),
            None => (self.travel.find_all().await?, self.valley.find_all().await?),
        };
        Ok(travel
            .into_iter()
            .map(|e| RequestRecord::Travel(e.into()))
            .chain(valley.into_iter().map(|e| RequestRecord::Valley(e.into())))
            .collect())
    }

    /// Requests of one kind, optionally restricted to one employee.
    pub async fn find_kind(
        &self,
        kind: RequestKind,
        employee_id: Option<Uuid>,
    ) -> Result<Vec<RequestRecord>, StoreError> {
        let records = match (kind, employee_id) {
            (RequestKind::Travel, Some(id)) => self
                .travel
                .find_by_employee_id(id)
                .await?
                .into_iter()
                .map(|e| RequestRecord::Travel(e.into()))
                .collect(),
            (RequestKind::Travel, None) => self
                .travel
                .find_all()
                .await?
                .into_iter()
                .map(|e| RequestRecord::Travel(e.into()))
                .collect(),
            (RequestKind::Valley, Some(id)) => self
                .valley
                .find_by_employee_id(id)
                .await?
                .into_iter()
                .map(|e| RequestRecord::Valley(e.into()))
                .collect(),
            (RequestKind::Valley, None) => self
                .valley
                .find_all()
                .await?
                .into_iter()
                .map(|e| RequestRecord::Valley(e.into()))
                .collect(),
        };
        Ok(records)
    }
}

#[async_trait]
impl RequestStore for PgRequestStore {
    async fn create_travel(&self, new: NewTravelRequest) -> Result<TravelRequest, StoreError> {
        Ok(self.travel.create(&new).await?.into())
    }

    async fn create_valley(&self, new: NewValleyRequest) -> Result<ValleyRequest, StoreError> {
        Ok(self.valley.create(&new).await?.into())
    }

    async fn find(
        &self,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<Option<RequestRecord>, StoreError> {
        Ok(match kind {
            RequestKind::Travel => self
                .travel
                .find_by_id(id)
                .await?
                .map(|e| RequestRecord::Travel(e.into())),
            RequestKind::Valley => self
                .valley
                .find_by_id(id)
                .await?
                .map(|e| RequestRecord::Valley(e.into())),
        })
    }

    async fn apply_decision(
        &self,
        kind: RequestKind,
        id: Uuid,
        expected: RequestStatus,
        change: &StatusChange,
    ) -> Result<Option<RequestRecord>, StoreError> {
        Ok(match kind {
            RequestKind::Travel => self
                .travel
                .update_status(id, expected, change)
                .await?
                .map(|e| RequestRecord::Travel(e.into())),
            RequestKind::Valley => self
                .valley
                .update_status(id, expected, change)
                .await?
                .map(|e| RequestRecord::Valley(e.into())),
        })
    }

    async fn submit_expenses(
        &self,
        id: Uuid,
        expected: RequestStatus,
        submission: &SubmitExpensesRequest,
    ) -> Result<Option<TravelRequest>, StoreError> {
        Ok(self
            .travel
            .submit_expenses(id, expected, submission)
            .await?
            .map(Into::into))
    }

    async fn add_item(
        &self,
        kind: RequestKind,
        request_id: Uuid,
        expected: RequestStatus,
        item: &NewExpenseItem,
    ) -> Result<Option<ExpenseItem>, StoreError> {
        Ok(self
            .expenses
            .add_item(kind, request_id, expected, item)
            .await?
            .map(Into::into))
    }

    async fn delete(&self, kind: RequestKind, id: Uuid) -> Result<bool, StoreError> {
        Ok(match kind {
            RequestKind::Travel => self.travel.delete(id).await?,
            RequestKind::Valley => self.valley.delete(id).await?,
        })
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn user_ids_with_role(&self, role: UserRole) -> Result<Vec<Uuid>, StoreError> {
        Ok(self.ids_with_role(role.into()).await?)
    }
}

#[async_trait]
impl NotificationSink for NotificationRepository {
    async fn notify(
        &self,
        user_id: Uuid,
        request_id: Option<Uuid>,
        message: &str,
    ) -> Result<(), StoreError> {
        self.create(user_id, request_id, message).await?;
        Ok(())
    }
}

/// Budget ledger over the projects and budgets tables.
#[derive(Clone)]
pub struct PgBudgetLedger {
    projects: ProjectRepository,
    budgets: BudgetRepository,
}

impl PgBudgetLedger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            projects: ProjectRepository::new(pool.clone()),
            budgets: BudgetRepository::new(pool),
        }
    }
}

#[async_trait]
impl BudgetLedger for PgBudgetLedger {
    async fn find_project(&self, project_id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.find_by_id(project_id).await?.map(Into::into))
    }

    async fn current_budget(&self, project_id: Uuid) -> Result<Option<Budget>, StoreError> {
        Ok(self
            .budgets
            .current_for_project(project_id)
            .await?
            .map(Into::into))
    }

    async fn find_budget(&self, budget_id: Uuid) -> Result<Option<Budget>, StoreError> {
        Ok(self.budgets.find_by_id(budget_id).await?.map(Into::into))
    }

    async fn compare_and_set(
        &self,
        budget_id: Uuid,
        expected_version: i64,
        new_amount: Decimal,
    ) -> Result<bool, StoreError> {
        Ok(self
            .budgets
            .compare_and_set(budget_id, expected_version, new_amount)
            .await?)
    }
}
