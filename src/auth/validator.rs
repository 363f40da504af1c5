//! Authentication validator
//!
//! Implements user authentication logic, including username and password validation.
//! Credentials come from the `[users]` table of the configuration.

use std::collections::HashMap;

use crate::error::AuthError;

/// Username -> password table loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
    max_length: usize,
}

impl CredentialStore {
    pub fn new(users: HashMap<String, String>, max_length: usize) -> Self {
        Self { users, max_length }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Performs basic input sanitation to check for malicious or malformed usernames/passwords.
fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.trim().is_empty() && input.len() <= max_length && !input.chars().any(char::is_control)
}

/// Validates that the given username exists in the credential store.
pub fn validate_user(username: &str, store: &CredentialStore) -> Result<(), AuthError> {
    if username.contains('/') {
        return Err(AuthError::InvalidUsername(username.to_string()));
    }

    if !is_valid_input(username, store.max_length) {
        return Err(AuthError::MalformedInput("Invalid username format".into()));
    }

    if store.users.contains_key(username) {
        Ok(())
    } else {
        Err(AuthError::UserNotFound(username.to_string()))
    }
}

/// Validates that the provided password matches the stored password for the username.
pub fn validate_password(
    username: &str,
    password: &str,
    store: &CredentialStore,
) -> Result<(), AuthError> {
    if password.is_empty() || password.chars().any(char::is_control) {
        return Err(AuthError::MalformedInput("Invalid password format".into()));
    }

    match store.users.get(username) {
        Some(stored) if stored == password => Ok(()),
        Some(_) => Err(AuthError::InvalidPassword(username.to_string())),
        None => Err(AuthError::UserNotFound(username.to_string())),
    }
}
