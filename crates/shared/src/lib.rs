//! Shared utilities and common types for the travel expense backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Access token issuing and validation (RS256 JWT)
//! - Password hashing with Argon2id
//! - Page-based pagination helpers
//! - Content digests for stored receipt files
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
