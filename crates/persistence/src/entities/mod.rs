//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod expense;
pub mod notification;
pub mod project;
pub mod request;
pub mod user;
pub mod valley_request;

pub use expense::{ExpenseCategoryDb, ExpenseItemEntity, ReceiptEntity, RequestKindDb};
pub use notification::NotificationEntity;
pub use project::{BudgetEntity, ProjectEntity};
pub use request::{RequestStatusDb, RequestTypeDb, TravelRequestEntity};
pub use user::{UserEntity, UserRoleDb};
pub use valley_request::ValleyRequestEntity;
