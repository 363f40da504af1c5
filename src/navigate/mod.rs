//! Navigate module
//!
//! Resolves paths against a user's tree for the session layer.

mod resolver;

// Re-export public types and functions
pub use resolver::{Resolution, path_components, render_path, resolve, split_parent};
