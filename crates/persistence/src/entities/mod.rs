//! Entity definitions (database row mappings).

pub mod account;
pub mod profile;

pub use account::AccountEntity;
pub use profile::{OtpAttemptRow, ProfileEntity};
