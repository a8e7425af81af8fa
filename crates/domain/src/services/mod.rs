//! Domain services for the reimbursement workflow.
//!
//! Services hold business rules and talk to storage through the port traits
//! defined here; the persistence crate implements them.

pub mod budget;
pub mod listing;
pub mod notification;
pub mod requests;
pub mod stats;
pub mod workflow;

pub use budget::{BudgetDeduction, BudgetLedger};
pub use listing::{RequestListQuery, SortField, SortOrder, UserListQuery};
pub use notification::{fan_out, FanOutReport, MockNotificationSink, NotificationSink};
pub use requests::{RequestStore, RequestWorkflow, StatusChange, UserDirectory, WorkflowOutcome};
pub use workflow::{ReviewStage, Transition};
