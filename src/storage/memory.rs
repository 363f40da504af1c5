//! In-memory node store.
//!
//! Used for tests and the `memory` backend. All data is lost when dropped.

use log::debug;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use crate::error::StoreError;
use crate::storage::node::{Node, NodeId, NodeKind, now_millis};
use crate::storage::store::NodeStore;

type SiblingKey = (String, Option<NodeId>, String);

#[derive(Default)]
struct State {
    nodes: HashMap<NodeId, Node>,
    /// `(owner, parent, name)` -> id. Ordered so one parent's children are a contiguous range.
    index: BTreeMap<SiblingKey, NodeId>,
    /// Last working directory per owner
    positions: HashMap<String, String>,
    next_id: i64,
}

impl State {
    fn check_parent(&self, owner: &str, parent: Option<NodeId>) -> Result<(), StoreError> {
        let Some(id) = parent else {
            return Ok(());
        };
        match self.nodes.get(&id) {
            Some(node) if node.owner != owner => Err(StoreError::MissingParent(id)),
            Some(node) if !node.is_dir() => Err(StoreError::ParentNotDirectory(id)),
            Some(_) => Ok(()),
            None => Err(StoreError::MissingParent(id)),
        }
    }

    fn sibling_ids(&self, owner: &str, parent: Option<NodeId>) -> Vec<NodeId> {
        let start = (owner.to_string(), parent, String::new());
        self.index
            .range(start..)
            .take_while(|((o, p, _), _)| o == owner && *p == parent)
            .map(|(_, id)| *id)
            .collect()
    }
}

/// Arena of nodes plus a unique sibling index, behind one lock.
///
/// Every mutation takes the write lock for its whole duration, so the
/// uniqueness check and the insert happen as one step.
pub struct MemoryStore {
    state: RwLock<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_id: 1,
                ..State::default()
            }),
        }
    }

    /// Total number of stored nodes across all owners.
    pub fn len(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NodeStore for MemoryStore {
    fn create(
        &self,
        owner: &str,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
        content: Option<&str>,
    ) -> Result<NodeId, StoreError> {
        let mut state = self.state.write();
        state.check_parent(owner, parent)?;

        let key = (owner.to_string(), parent, name.to_string());
        if state.index.contains_key(&key) {
            return Err(StoreError::Conflict(name.to_string()));
        }

        let id = NodeId(state.next_id);
        state.next_id += 1;

        let now = now_millis();
        let content = match kind {
            NodeKind::File => Some(content.unwrap_or_default().to_string()),
            NodeKind::Directory => None,
        };
        state.index.insert(key, id);
        state.nodes.insert(
            id,
            Node {
                id,
                owner: owner.to_string(),
                parent,
                name: name.to_string(),
                kind,
                content,
                created_at: now,
                updated_at: now,
            },
        );

        debug!("memory store: created {:?} {} for {}", kind, id, owner);
        Ok(id)
    }

    fn get(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        Ok(self.state.read().nodes.get(&id).cloned())
    }

    fn find_child(
        &self,
        owner: &str,
        parent: Option<NodeId>,
        name: &str,
    ) -> Result<Option<Node>, StoreError> {
        let state = self.state.read();
        let key = (owner.to_string(), parent, name.to_string());
        Ok(state
            .index
            .get(&key)
            .and_then(|id| state.nodes.get(id))
            .cloned())
    }

    fn children(&self, owner: &str, parent: Option<NodeId>) -> Result<Vec<Node>, StoreError> {
        let state = self.state.read();
        let mut children: Vec<Node> = state
            .sibling_ids(owner, parent)
            .iter()
            .filter_map(|id| state.nodes.get(id).cloned())
            .collect();
        children.sort_by(Node::listing_cmp);
        Ok(children)
    }

    fn update_content(&self, id: NodeId, content: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        match state.nodes.get_mut(&id) {
            Some(node) if !node.is_dir() => {
                node.content = Some(content.to_string());
                node.updated_at = now_millis();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn rename(&self, id: NodeId, new_name: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write();

        let (owner, parent, old_name) = match state.nodes.get(&id) {
            Some(node) => (node.owner.clone(), node.parent, node.name.clone()),
            None => return Ok(false),
        };
        if old_name == new_name {
            return Ok(true);
        }

        let new_key = (owner.clone(), parent, new_name.to_string());
        if state.index.contains_key(&new_key) {
            return Err(StoreError::Conflict(new_name.to_string()));
        }

        state.index.remove(&(owner, parent, old_name));
        state.index.insert(new_key, id);
        if let Some(node) = state.nodes.get_mut(&id) {
            node.name = new_name.to_string();
            node.updated_at = now_millis();
        }
        Ok(true)
    }

    fn delete_subtree(&self, id: NodeId) -> Result<usize, StoreError> {
        let mut state = self.state.write();

        if !state.nodes.contains_key(&id) {
            return Ok(0);
        }

        // Collect the whole subtree first, then remove it under the same lock.
        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor];
            cursor += 1;
            if let Some(node) = state.nodes.get(&current) {
                if node.is_dir() {
                    let owner = node.owner.clone();
                    doomed.extend(state.sibling_ids(&owner, Some(current)));
                }
            }
        }

        for victim in &doomed {
            if let Some(node) = state.nodes.remove(victim) {
                state.index.remove(&(node.owner, node.parent, node.name));
            }
        }

        debug!("memory store: deleted subtree {} ({} nodes)", id, doomed.len());
        Ok(doomed.len())
    }

    fn save_position(&self, owner: &str, path: &str) -> Result<(), StoreError> {
        self.state
            .write()
            .positions
            .insert(owner.to_string(), path.to_string());
        Ok(())
    }

    fn load_position(&self, owner: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state.read().positions.get(owner).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_find() {
        let store = MemoryStore::new();
        let id = store
            .create("alice", None, "docs", NodeKind::Directory, None)
            .unwrap();

        let found = store.find_child("alice", None, "docs").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(found.is_dir());
        assert_eq!(found.content, None);

        // Other owners never see it
        assert!(store.find_child("bob", None, "docs").unwrap().is_none());
    }

    #[test]
    fn test_create_conflict_leaves_store_unchanged() {
        let store = MemoryStore::new();
        store.create("alice", None, "x", NodeKind::Directory, None).unwrap();

        let err = store
            .create("alice", None, "x", NodeKind::File, Some("data"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_checks_parent() {
        let store = MemoryStore::new();
        let file = store.create("alice", None, "f", NodeKind::File, None).unwrap();
        let bobs = store.create("bob", None, "d", NodeKind::Directory, None).unwrap();

        let err = store
            .create("alice", Some(NodeId(999)), "x", NodeKind::File, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingParent(NodeId(999))));

        let err = store
            .create("alice", Some(file), "x", NodeKind::File, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::ParentNotDirectory(_)));

        let err = store
            .create("alice", Some(bobs), "x", NodeKind::File, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingParent(_)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_positions() {
        let store = MemoryStore::new();
        assert_eq!(store.load_position("alice").unwrap(), None);
        store.save_position("alice", "/docs").unwrap();
        store.save_position("alice", "/home").unwrap();
        assert_eq!(store.load_position("alice").unwrap().as_deref(), Some("/home"));
        assert_eq!(store.load_position("bob").unwrap(), None);
    }

    #[test]
    fn test_children_order_dirs_first() {
        let store = MemoryStore::new();
        store.create("alice", None, "zeta", NodeKind::File, None).unwrap();
        store.create("alice", None, "beta", NodeKind::Directory, None).unwrap();
        store.create("alice", None, "alpha", NodeKind::File, None).unwrap();
        store.create("alice", None, "gamma", NodeKind::Directory, None).unwrap();

        let names: Vec<String> = store
            .children("alice", None)
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(names, vec!["beta", "gamma", "alpha", "zeta"]);
    }

    #[test]
    fn test_update_content_rejects_directories() {
        let store = MemoryStore::new();
        let dir = store.create("alice", None, "d", NodeKind::Directory, None).unwrap();
        let file = store.create("alice", None, "f", NodeKind::File, None).unwrap();

        assert!(!store.update_content(dir, "nope").unwrap());
        assert!(store.update_content(file, "hello").unwrap());
        assert_eq!(store.get(file).unwrap().unwrap().content.as_deref(), Some("hello"));
        assert!(!store.update_content(NodeId(999), "x").unwrap());
    }

    #[test]
    fn test_rename() {
        let store = MemoryStore::new();
        let a = store.create("alice", None, "a", NodeKind::File, None).unwrap();
        store.create("alice", None, "b", NodeKind::File, None).unwrap();

        assert!(matches!(store.rename(a, "b"), Err(StoreError::Conflict(_))));
        assert!(store.rename(a, "c").unwrap());
        assert!(store.find_child("alice", None, "a").unwrap().is_none());
        assert_eq!(store.find_child("alice", None, "c").unwrap().unwrap().id, a);
        assert!(!store.rename(NodeId(42), "z").unwrap());
    }

    #[test]
    fn test_delete_subtree_removes_descendants() {
        let store = MemoryStore::new();
        let top = store.create("alice", None, "top", NodeKind::Directory, None).unwrap();
        let mid = store.create("alice", Some(top), "mid", NodeKind::Directory, None).unwrap();
        let leaf = store.create("alice", Some(mid), "leaf", NodeKind::File, None).unwrap();
        let keep = store.create("alice", None, "keep", NodeKind::File, None).unwrap();

        assert_eq!(store.delete_subtree(top).unwrap(), 3);
        assert!(store.get(top).unwrap().is_none());
        assert!(store.get(mid).unwrap().is_none());
        assert!(store.get(leaf).unwrap().is_none());
        assert!(store.get(keep).unwrap().is_some());
        assert!(store.children("alice", Some(mid)).unwrap().is_empty());
        assert_eq!(store.delete_subtree(top).unwrap(), 0);
    }
}
