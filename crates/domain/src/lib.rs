//! Domain layer for the Phone Auth backend.
//!
//! This crate contains:
//! - Domain models (Account, Profile)
//! - The OTP and invite engines
//! - The profile store abstraction
//! - Domain error types

pub mod codes;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
