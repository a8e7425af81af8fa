//! Domain models for the reimbursement workflow.

pub mod expense;
pub mod notification;
pub mod project;
pub mod request;
pub mod stats;
pub mod user;
pub mod valley_request;

pub use expense::{
    AddExpenseItemRequest, ExpenseCategory, ExpenseItem, NewExpenseItem, NewReceipt, Receipt,
};
pub use notification::Notification;
pub use project::{Budget, CreateBudgetRequest, CreateProjectRequest, Project};
pub use request::{
    CreateTravelRequest, Decision, EmployeeSnapshot, NewTravelRequest, Phase, RequestKind,
    RequestRecord, RequestStatus, RequestType, StatusUpdateRequest, SubmitExpensesRequest,
    TravelRequest,
};
pub use stats::AdminStats;
pub use user::{
    Actor, CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, User, UserRole,
};
pub use valley_request::{CreateValleyRequest, NewValleyRequest, ValleyRequest};
