//! Business logic services.

pub mod delivery;
pub mod invite;
pub mod otp;

pub use delivery::{DeliveryError, OtpSender};
pub use invite::InviteEngine;
pub use otp::{OtpConfig, OtpEngine};
