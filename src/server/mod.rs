//! Server core functionality
//!
//! This module contains the listener, the per-connection login flow, and the
//! shared context handed to every session.

pub mod core;

pub use self::core::{Server, ServerContext};
