//! Repository implementations for database operations.

pub mod expense;
pub mod notification;
pub mod project;
pub mod receipt;
pub mod travel_request;
pub mod user;
pub mod valley_request;

pub use expense::ExpenseRepository;
pub use notification::NotificationRepository;
pub use project::{BudgetRepository, ProjectRepository};
pub use receipt::ReceiptRepository;
pub use travel_request::TravelRequestRepository;
pub use user::{UserChanges, UserRepository};
pub use valley_request::ValleyRequestRepository;
