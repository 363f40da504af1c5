//! Module `client`
//!
//! Defines the `Client` struct and associated methods to manage connection
//! state, including authentication status, connection address, and the
//! user's VFS session once logged in.

use std::net::SocketAddr;

use crate::session::VfsSession;

/// Represents the state of a connected client.
///
/// Tracks authentication status, client address, and the attached VFS
/// session, which only exists after a successful login.
#[derive(Default)]
pub struct Client {
    username: Option<String>,
    client_addr: Option<SocketAddr>,
    is_user_valid: bool,
    is_logged_in: bool,
    session: Option<VfsSession>,
}

impl Client {
    /// Resets the client state, logging out and clearing all stored data.
    pub fn logout(&mut self) {
        self.username = None;
        self.is_user_valid = false;
        self.is_logged_in = false;
        self.session = None;
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Returns whether the username provided by the client is valid.
    ///
    /// This indicates if the USER command was accepted.
    pub fn is_user_valid(&self) -> bool {
        self.is_user_valid
    }

    /// Returns whether the client has successfully logged in (passed authentication).
    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    /// Returns the username of the client if set.
    pub fn username(&self) -> Option<&String> {
        self.username.as_ref()
    }

    /// Returns the client's socket address if known.
    pub fn client_addr(&self) -> Option<&SocketAddr> {
        self.client_addr.as_ref()
    }

    pub fn session(&self) -> Option<&VfsSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut VfsSession> {
        self.session.as_mut()
    }

    // --------------------
    // Setter methods
    // --------------------

    /// Sets the validity state of the username.
    ///
    /// Typically set after USER command validation.
    pub fn set_user_valid(&mut self, valid: bool) {
        self.is_user_valid = valid;
    }

    /// Sets the login state of the client.
    ///
    /// Typically set after successful PASS command validation.
    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.is_logged_in = logged_in;
    }

    /// Sets the username of the client.
    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    /// Sets the client's socket address.
    pub fn set_client_addr(&mut self, addr: Option<SocketAddr>) {
        self.client_addr = addr;
    }

    /// Attaches the user's VFS session after login.
    pub fn attach_session(&mut self, session: VfsSession) {
        self.session = Some(session);
    }
}
