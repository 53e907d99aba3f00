//! External service integrations.

pub mod admin_bootstrap;
pub mod sms;

#[allow(unused_imports)] // Used in app setup
pub use sms::SmsService;
