//! Error types
//!
//! Defines domain-specific error types for each module of the VFS server.

use std::io;
use thiserror::Error;

use crate::storage::NodeId;

/// Node store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A sibling with the same `(owner, parent, name)` already exists.
    #[error("name already taken: {0}")]
    Conflict(String),

    /// The parent id does not name a node of the same owner.
    #[error("parent does not exist: {0}")]
    MissingParent(NodeId),

    /// Only directories can have children.
    #[error("parent is not a directory: {0}")]
    ParentNotDirectory(NodeId),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Session-level errors, one variant per failure a command can report
#[derive(Debug, Error)]
pub enum VfsError {
    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A directory blocks creation of a file with the same name.
    #[error("A directory with that name already exists: {0}")]
    NameConflict(String),

    #[error("Directory not empty: {0} (use rm -r)")]
    DirectoryNotEmpty(String),

    #[error("Cannot remove the root directory")]
    RootProtected,

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Storage failure: {0}")]
    Storage(StoreError),
}

impl VfsError {
    /// Short machine-friendly label, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            VfsError::NotFound(_) => "not_found",
            VfsError::NotADirectory(_) => "not_a_directory",
            VfsError::IsADirectory(_) => "is_a_directory",
            VfsError::AlreadyExists(_) => "already_exists",
            VfsError::NameConflict(_) => "name_conflict",
            VfsError::DirectoryNotEmpty(_) => "directory_not_empty",
            VfsError::RootProtected => "root_protected",
            VfsError::Unsupported(_) => "unsupported",
            VfsError::InvalidName(_) => "invalid_name",
            VfsError::Storage(_) => "storage",
        }
    }
}

// Uniqueness races surface as AlreadyExists, never as a raw store fault.
impl From<StoreError> for VfsError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(name) => VfsError::AlreadyExists(name),
            StoreError::MissingParent(id) => VfsError::NotFound(format!("node {}", id)),
            StoreError::ParentNotDirectory(id) => VfsError::NotADirectory(format!("node {}", id)),
            other => VfsError::Storage(other),
        }
    }
}

/// Authentication module errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Login incorrect for user: {0}")]
    InvalidPassword(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("User already has an active session: {0}")]
    AlreadyConnected(String),
}

/// General server error that encompasses all error types
#[derive(Debug, Error)]
pub enum RaxVfsError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
