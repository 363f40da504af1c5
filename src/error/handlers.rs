//! Error handlers
//!
//! Maps errors onto protocol reply codes.

use crate::error::types::{AuthError, RaxVfsError, VfsError};
use crate::protocol::responses;
use log::error;

/// Handle a server error that terminates a connection
pub fn handle_error(err: &RaxVfsError) {
    error!("VFS Server Error: {}", err);
}

/// Convert a session error to its reply code
pub fn reply_code(err: &VfsError) -> u16 {
    match err {
        VfsError::NotFound(_)
        | VfsError::NotADirectory(_)
        | VfsError::IsADirectory(_)
        | VfsError::RootProtected => responses::ACTION_NOT_TAKEN,
        VfsError::AlreadyExists(_) | VfsError::NameConflict(_) => responses::NAME_EXISTS,
        VfsError::DirectoryNotEmpty(_) => responses::DIRECTORY_NOT_EMPTY,
        VfsError::Unsupported(_) => responses::NOT_IMPLEMENTED,
        VfsError::InvalidName(_) => responses::BAD_ARGUMENTS,
        VfsError::Storage(_) => responses::LOCAL_ERROR,
    }
}

/// Convert an authentication error to its reply code
pub fn auth_reply_code(err: &AuthError) -> u16 {
    match err {
        AuthError::MalformedInput(_) => responses::BAD_ARGUMENTS,
        _ => responses::NOT_LOGGED_IN,
    }
}
