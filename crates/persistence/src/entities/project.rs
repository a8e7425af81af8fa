//! Project and budget entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Budget, Project};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the projects table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProjectEntity> for Project {
    fn from(entity: ProjectEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description.unwrap_or_default(),
            active: entity.active,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the budgets table.
#[derive(Debug, Clone, FromRow)]
pub struct BudgetEntity {
    pub id: Uuid,
    pub project_id: Uuid,
    pub amount: Decimal,
    pub fiscal_year: String,
    pub description: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BudgetEntity> for Budget {
    fn from(entity: BudgetEntity) -> Self {
        Self {
            id: entity.id,
            project_id: entity.project_id,
            amount: entity.amount,
            fiscal_year: entity.fiscal_year,
            description: entity.description.unwrap_or_default(),
            version: entity.version,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
