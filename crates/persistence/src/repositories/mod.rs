//! Repository implementations.

pub mod account;
pub mod profile;

pub use account::AccountRepository;
pub use profile::ProfileRepository;
