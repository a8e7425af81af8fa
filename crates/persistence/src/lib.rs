//! Persistence layer for the travel expense backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - PostgreSQL implementations of the domain storage ports

pub mod db;
pub mod entities;
pub mod metrics;
pub mod ports;
pub mod repositories;
