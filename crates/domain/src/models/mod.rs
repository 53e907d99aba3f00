//! Domain models.

pub mod account;
pub mod profile;

pub use account::{Account, AccountUpdate};
pub use profile::{OtpChallenge, Profile};
