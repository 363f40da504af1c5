//! Session registry
//!
//! Tracks which users are connected. Where each user left off is kept by the
//! node store, so it survives restarts.

use std::collections::HashMap;
use std::net::SocketAddr;

use crate::error::AuthError;

/// Registry of active sessions, keyed by username
pub struct SessionRegistry {
    active: HashMap<String, SocketAddr>,
    max_clients: usize,
}

impl SessionRegistry {
    pub fn new(max_clients: usize) -> Self {
        Self {
            active: HashMap::new(),
            max_clients,
        }
    }

    pub fn is_full(&self) -> bool {
        self.active.len() >= self.max_clients
    }

    /// Claims the single active session slot for `username`.
    pub fn register(&mut self, username: &str, addr: SocketAddr) -> Result<(), AuthError> {
        if self.active.contains_key(username) {
            return Err(AuthError::AlreadyConnected(username.to_string()));
        }
        self.active.insert(username.to_string(), addr);
        Ok(())
    }

    /// Frees the user's slot.
    pub fn release(&mut self, username: &str) {
        self.active.remove(username);
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }
}
