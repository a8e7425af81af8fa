//! Domain layer for the travel expense backend.
//!
//! This crate contains:
//! - Domain models (travel and in-valley requests, expenses, receipts,
//!   notifications, projects, budgets, users)
//! - The request workflow: transition table, budget allocation and
//!   notification fan-out, written against storage ports
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;
