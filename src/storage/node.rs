//! Node types
//!
//! A node is a single directory or file entry in one owner's tree. The root is
//! never stored: a node whose `parent` is `None` sits directly under it.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque node identifier assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of node, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Directory,
    File,
}

impl NodeKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

/// A stored tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub owner: String,
    /// `None` means the node lives directly under the owner's root.
    pub parent: Option<NodeId>,
    pub name: String,
    pub kind: NodeKind,
    /// Always `None` for directories.
    pub content: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub updated_at: i64,
}

impl Node {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Listing order: directories first, then by name.
    pub(crate) fn listing_cmp(a: &Node, b: &Node) -> std::cmp::Ordering {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.name.cmp(&b.name))
    }
}

/// Current wall-clock time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
