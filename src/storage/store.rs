//! Node store contract
//!
//! Durable CRUD over nodes, scoped by owner. Implementations must enforce the
//! `(owner, parent, name)` uniqueness at the point of mutation and make
//! `delete_subtree` all-or-nothing for readers.

use crate::error::StoreError;
use crate::storage::node::{Node, NodeId, NodeKind};

/// Backing store for every user's tree.
///
/// All methods take `&self`; implementations serialize mutations internally so a
/// single store can be shared across sessions.
pub trait NodeStore: Send + Sync {
    /// Creates a node under `parent` (`None` is the root).
    ///
    /// Fails with [`StoreError::Conflict`] if a sibling already has `name`, and
    /// with [`StoreError::MissingParent`] / [`StoreError::ParentNotDirectory`]
    /// unless `parent` is a directory of the same owner.
    fn create(
        &self,
        owner: &str,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
        content: Option<&str>,
    ) -> Result<NodeId, StoreError>;

    fn get(&self, id: NodeId) -> Result<Option<Node>, StoreError>;

    fn find_child(
        &self,
        owner: &str,
        parent: Option<NodeId>,
        name: &str,
    ) -> Result<Option<Node>, StoreError>;

    /// Children of `parent`, directories first, then by name.
    fn children(&self, owner: &str, parent: Option<NodeId>) -> Result<Vec<Node>, StoreError>;

    /// Replaces a file's content. Returns `false` if `id` is missing or a directory.
    fn update_content(&self, id: NodeId, content: &str) -> Result<bool, StoreError>;

    /// Renames in place. Returns `false` if `id` is missing, fails with
    /// [`StoreError::Conflict`] if a sibling already has `new_name`.
    fn rename(&self, id: NodeId, new_name: &str) -> Result<bool, StoreError>;

    /// Removes `id` and every descendant. Returns the number of nodes removed.
    fn delete_subtree(&self, id: NodeId) -> Result<usize, StoreError>;

    /// Records the owner's working directory so the next login can resume there.
    fn save_position(&self, owner: &str, path: &str) -> Result<(), StoreError>;

    fn load_position(&self, owner: &str) -> Result<Option<String>, StoreError>;

    /// Whether the owner has anything directly under the root.
    fn has_root_nodes(&self, owner: &str) -> Result<bool, StoreError> {
        Ok(!self.children(owner, None)?.is_empty())
    }
}
