//! Session result types
//!
//! Payloads returned by session operations.

use crate::storage::{NodeId, NodeKind};

/// What a `touch` or `write` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Written {
    Created(NodeId),
    Updated(NodeId),
}

impl Written {
    pub fn id(&self) -> NodeId {
        match self {
            Written::Created(id) | Written::Updated(id) => *id,
        }
    }
}

/// One rendered line of a `tree` dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    /// Connector prefix plus the entry name, e.g. `│   └── notes.txt`.
    pub line: String,
    pub name: String,
    pub kind: NodeKind,
    /// Zero for direct children of the starting directory.
    pub depth: usize,
}
