//! Application services that sit between handlers and the domain crate.

pub mod admin_bootstrap;
pub mod auth;
pub mod receipt_storage;

pub use admin_bootstrap::bootstrap_admin;
pub use auth::{AuthError, AuthService};
pub use receipt_storage::{ReceiptError, ReceiptStorage, ReceiptUpload};
