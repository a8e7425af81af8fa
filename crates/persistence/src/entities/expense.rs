//! Expense item and receipt entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ExpenseCategory, ExpenseItem, Receipt, RequestKind};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for expense_category that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "expense_category", rename_all = "snake_case")]
pub enum ExpenseCategoryDb {
    Accommodation,
    Transportation,
    Meals,
    PerDiem,
    LocalConveyance,
    Registration,
    Communication,
    Miscellaneous,
}

impl From<ExpenseCategoryDb> for ExpenseCategory {
    fn from(category: ExpenseCategoryDb) -> Self {
        match category {
            ExpenseCategoryDb::Accommodation => ExpenseCategory::Accommodation,
            ExpenseCategoryDb::Transportation => ExpenseCategory::Transportation,
            ExpenseCategoryDb::Meals => ExpenseCategory::Meals,
            ExpenseCategoryDb::PerDiem => ExpenseCategory::PerDiem,
            ExpenseCategoryDb::LocalConveyance => ExpenseCategory::LocalConveyance,
            ExpenseCategoryDb::Registration => ExpenseCategory::Registration,
            ExpenseCategoryDb::Communication => ExpenseCategory::Communication,
            ExpenseCategoryDb::Miscellaneous => ExpenseCategory::Miscellaneous,
        }
    }
}

impl From<ExpenseCategory> for ExpenseCategoryDb {
    fn from(category: ExpenseCategory) -> Self {
        match category {
            ExpenseCategory::Accommodation => ExpenseCategoryDb::Accommodation,
            ExpenseCategory::Transportation => ExpenseCategoryDb::Transportation,
            ExpenseCategory::Meals => ExpenseCategoryDb::Meals,
            ExpenseCategory::PerDiem => ExpenseCategoryDb::PerDiem,
            ExpenseCategory::LocalConveyance => ExpenseCategoryDb::LocalConveyance,
            ExpenseCategory::Registration => ExpenseCategoryDb::Registration,
            ExpenseCategory::Communication => ExpenseCategoryDb::Communication,
            ExpenseCategory::Miscellaneous => ExpenseCategoryDb::Miscellaneous,
        }
    }
}

/// Database enum for request_kind that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_kind", rename_all = "lowercase")]
pub enum RequestKindDb {
    Travel,
    Valley,
}

impl From<RequestKindDb> for RequestKind {
    fn from(kind: RequestKindDb) -> Self {
        match kind {
            RequestKindDb::Travel => RequestKind::Travel,
            RequestKindDb::Valley => RequestKind::Valley,
        }
    }
}

impl From<RequestKind> for RequestKindDb {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Travel => RequestKindDb::Travel,
            RequestKind::Valley => RequestKindDb::Valley,
        }
    }
}

/// Database row mapping for the expense_items and valley_expense_items tables.
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseItemEntity {
    pub id: Uuid,
    pub request_id: Uuid,
    pub category: ExpenseCategoryDb,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ExpenseItemEntity> for ExpenseItem {
    fn from(entity: ExpenseItemEntity) -> Self {
        Self {
            id: entity.id,
            request_id: entity.request_id,
            category: entity.category.into(),
            amount: entity.amount,
            description: entity.description,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the receipts table.
#[derive(Debug, Clone, FromRow)]
pub struct ReceiptEntity {
    pub id: Uuid,
    pub expense_item_id: Uuid,
    pub request_kind: RequestKindDb,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_type: String,
    pub storage_path: String,
    pub public_url: String,
    pub upload_date: DateTime<Utc>,
}

impl From<ReceiptEntity> for Receipt {
    fn from(entity: ReceiptEntity) -> Self {
        Self {
            id: entity.id,
            expense_item_id: entity.expense_item_id,
            request_kind: entity.request_kind.into(),
            original_filename: entity.original_filename,
            stored_filename: entity.stored_filename,
            file_type: entity.file_type,
            storage_path: entity.storage_path,
            public_url: entity.public_url,
            upload_date: entity.upload_date,
        }
    }
}
