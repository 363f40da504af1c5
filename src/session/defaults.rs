//! Default layout for a fresh user tree.

/// Top-level directories every new user receives.
pub const DEFAULT_DIRECTORIES: &[&str] = &["home", "documents", "downloads", "data"];

pub const WELCOME_FILE: &str = "README.txt";

pub const WELCOME_TEXT: &str = "Welcome to RAX VFS!\n\n\
This is your personal space. You can store files and data here.\n\n\
Type HELP to see the available commands.";

/// Default depth for `tree` when the caller gives none.
pub const DEFAULT_TREE_DEPTH: usize = 3;

/// Deepest level `tree` will descend to, whatever the caller asks for.
pub const MAX_TREE_DEPTH: usize = 64;
