//! Project and budget repositories for database operations.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{BudgetEntity, ProjectEntity};
use crate::metrics::QueryTimer;

/// Repository for projects.
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Creates a new ProjectRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<ProjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_all_projects");
        let result = sqlx::query_as::<_, ProjectEntity>(
            "SELECT id, name, description, active, created_at FROM projects ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_project_by_id");
        let result = sqlx::query_as::<_, ProjectEntity>(
            "SELECT id, name, description, active, created_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(
        &self,
        name: &str,
        description: &str,
        active: bool,
    ) -> Result<ProjectEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_project");
        let result = sqlx::query_as::<_, ProjectEntity>(
            r#"
            INSERT INTO projects (name, description, active)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, active, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(active)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

const BUDGET_COLUMNS: &str =
    "id, project_id, amount, fiscal_year, description, version, created_at, updated_at";

/// Repository for budget allocations.
#[derive(Clone)]
pub struct BudgetRepository {
    pool: PgPool,
}

impl BudgetRepository {
    /// Creates a new BudgetRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<BudgetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_all_budgets");
        let sql = format!(
            "SELECT {} FROM budgets ORDER BY created_at DESC",
            BUDGET_COLUMNS
        );
        let result = sqlx::query_as::<_, BudgetEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BudgetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_budget_by_id");
        let sql = format!("SELECT {} FROM budgets WHERE id = $1", BUDGET_COLUMNS);
        let result = sqlx::query_as::<_, BudgetEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// The most recently allocated budget row of a project.
    pub async fn current_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Option<BudgetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_current_budget_for_project");
        let sql = format!(
            r#"
            SELECT {} FROM budgets
            WHERE project_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            BUDGET_COLUMNS
        );
        let result = sqlx::query_as::<_, BudgetEntity>(&sql)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// The current budget row of every project.
    pub async fn current_budgets(&self) -> Result<Vec<BudgetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_current_budgets");
        let sql = format!(
            r#"
            SELECT DISTINCT ON (project_id) {}
            FROM budgets
            ORDER BY project_id, created_at DESC
            "#,
            BUDGET_COLUMNS
        );
        let result = sqlx::query_as::<_, BudgetEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        amount: Decimal,
        fiscal_year: &str,
        description: &str,
    ) -> Result<BudgetEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_budget");
        let sql = format!(
            r#"
            INSERT INTO budgets (project_id, amount, fiscal_year, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            BUDGET_COLUMNS
        );
        let result = sqlx::query_as::<_, BudgetEntity>(&sql)
            .bind(project_id)
            .bind(amount)
            .bind(fiscal_year)
            .bind(description)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Sets the amount only if the row is still at `expected_version`.
    pub async fn compare_and_set(
        &self,
        id: Uuid,
        expected_version: i64,
        new_amount: Decimal,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("compare_and_set_budget");
        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET amount = $3, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(new_amount)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() == 1)
    }
}
