//! VFS session
//!
//! Per-user cursor over the node store exposing the shell-like operations.

pub mod defaults;
pub mod results;
pub mod vfs;

pub use defaults::{DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH};
pub use results::{TreeLine, Written};
pub use vfs::{VfsResult, VfsSession, validate_name};
