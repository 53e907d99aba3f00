//! Shared utilities and common types for the Phone Auth backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Phone number and invite code validation
//! - Password hashing with Argon2id
//! - Session token generation and validation

pub mod password;
pub mod session;
pub mod validation;
