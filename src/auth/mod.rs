//! Authentication system
//!
//! Validates usernames and passwords against the configured credential table.

pub mod validator;

pub use validator::{CredentialStore, validate_password, validate_user};
