//! Module `vfs`
//!
//! Defines `VfsSession`, the per-user cursor over the node store that exposes
//! the Unix-like operation set (cd, ls, mkdir, touch, cat, write, rm, mv, tree).

use log::{info, warn};
use std::sync::Arc;

use crate::error::VfsError;
use crate::navigate::{Resolution, render_path, resolve, split_parent};
use crate::session::defaults::{
    DEFAULT_DIRECTORIES, MAX_TREE_DEPTH, WELCOME_FILE, WELCOME_TEXT,
};
use crate::session::results::{TreeLine, Written};
use crate::storage::{Node, NodeId, NodeKind, NodeStore};

pub type VfsResult<T> = Result<T, VfsError>;

/// Checks a single path component used as a new name.
pub fn validate_name(name: &str) -> VfsResult<()> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// A user's position in their tree.
///
/// Holds the owner, the current directory (`None` for the root) and its
/// rendered path. Relative paths resolve against this position.
pub struct VfsSession {
    store: Arc<dyn NodeStore>,
    owner: String,
    current: Option<NodeId>,
    cwd: String,
}

impl VfsSession {
    /// Starts a session for `owner` at the root.
    pub fn open(store: Arc<dyn NodeStore>, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
            current: None,
            cwd: "/".to_string(),
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Current directory node, `None` at the root.
    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    /// Current path, always starting with `/`.
    pub fn pwd(&self) -> &str {
        &self.cwd
    }

    // --------------------
    // Navigation
    // --------------------

    /// Changes directory. An empty path goes back to the root.
    pub fn cd(&mut self, path: &str) -> VfsResult<String> {
        if path.is_empty() {
            self.current = None;
            self.cwd = "/".to_string();
            return Ok(self.cwd.clone());
        }

        let (node, resolved) = self.resolve_existing(path)?;
        if let Some(id) = node {
            if !self.load(id, &resolved)?.is_dir() {
                return Err(VfsError::NotADirectory(resolved));
            }
        }

        self.current = node;
        self.cwd = resolved;
        Ok(self.cwd.clone())
    }

    /// Moves to `path` if it still names a directory, otherwise stays at the root.
    pub fn restore(&mut self, path: &str) -> &str {
        if let Err(e) = self.cd(path) {
            warn!("Could not restore {} for {}: {}", path, self.owner, e);
            self.current = None;
            self.cwd = "/".to_string();
        }
        &self.cwd
    }

    /// Lists a directory, or describes a single file.
    ///
    /// `None` lists the current directory.
    pub fn ls(&self, path: Option<&str>) -> VfsResult<Vec<Node>> {
        let target = match path {
            None => self.current,
            Some(path) => {
                let (node, resolved) = self.resolve_existing(path)?;
                if let Some(id) = node {
                    let node = self.load(id, &resolved)?;
                    if !node.is_dir() {
                        return Ok(vec![node]);
                    }
                }
                node
            }
        };
        Ok(self.store.children(&self.owner, target)?)
    }

    /// Renders the tree below the current directory, at most `max_depth` levels deep.
    ///
    /// Depths beyond [`MAX_TREE_DEPTH`] are clamped.
    pub fn tree(&self, max_depth: usize) -> VfsResult<Vec<TreeLine>> {
        let max_depth = max_depth.min(MAX_TREE_DEPTH);
        let mut lines = Vec::new();
        self.build_tree(self.current, "", 0, max_depth, &mut lines)?;
        Ok(lines)
    }

    fn build_tree(
        &self,
        parent: Option<NodeId>,
        prefix: &str,
        depth: usize,
        max_depth: usize,
        lines: &mut Vec<TreeLine>,
    ) -> VfsResult<()> {
        if depth >= max_depth {
            return Ok(());
        }

        let children = self.store.children(&self.owner, parent)?;
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "└── " } else { "├── " };
            lines.push(TreeLine {
                line: format!("{}{}{}", prefix, connector, child.name),
                name: child.name.clone(),
                kind: child.kind,
                depth,
            });

            if child.is_dir() {
                let continuation = if is_last { "    " } else { "│   " };
                let next_prefix = format!("{}{}", prefix, continuation);
                self.build_tree(Some(child.id), &next_prefix, depth + 1, max_depth, lines)?;
            }
        }
        Ok(())
    }

    // --------------------
    // Files and directories
    // --------------------

    /// Creates a directory in the current directory.
    pub fn mkdir(&self, name: &str) -> VfsResult<NodeId> {
        validate_name(name)?;
        let id = self
            .store
            .create(&self.owner, self.current, name, NodeKind::Directory, None)?;
        info!("{}: mkdir {}", self.owner, self.child_path(name));
        Ok(id)
    }

    /// Creates a file in the current directory, or overwrites an existing file's content.
    pub fn touch(&self, name: &str, content: &str) -> VfsResult<Written> {
        validate_name(name)?;
        self.put_file(self.current, name, content)
    }

    /// Reads a file.
    pub fn cat(&self, path: &str) -> VfsResult<String> {
        let (node, resolved) = self.resolve_existing(path)?;
        let Some(id) = node else {
            return Err(VfsError::IsADirectory(resolved));
        };

        let node = self.load(id, &resolved)?;
        if node.is_dir() {
            return Err(VfsError::IsADirectory(resolved));
        }
        Ok(node.content.unwrap_or_default())
    }

    /// Writes a file, creating it if the last path segment does not exist.
    ///
    /// Missing intermediate directories are never created.
    pub fn write(&self, path: &str, content: &str) -> VfsResult<Written> {
        match self.resolve(path)? {
            Resolution::Found { node: None, path } => Err(VfsError::IsADirectory(path)),
            Resolution::Found {
                node: Some(id),
                path,
            } => {
                if self.load(id, &path)?.is_dir() {
                    return Err(VfsError::IsADirectory(path));
                }
                if !self.store.update_content(id, content)? {
                    return Err(VfsError::NotFound(path));
                }
                info!("{}: updated {}", self.owner, path);
                Ok(Written::Updated(id))
            }
            Resolution::Missing { path: missing } => {
                let (parent_path, name) =
                    split_parent(path).ok_or_else(|| VfsError::InvalidName(path.to_string()))?;
                validate_name(name)?;

                let parent = if parent_path.is_empty() {
                    self.current
                } else {
                    let (node, resolved) = self.resolve_existing(parent_path)?;
                    if let Some(id) = node {
                        if !self.load(id, &resolved)?.is_dir() {
                            return Err(VfsError::NotADirectory(resolved));
                        }
                    }
                    node
                };

                let written = self.put_file(parent, name, content)?;
                info!("{}: created {}", self.owner, missing);
                Ok(written)
            }
        }
    }

    fn put_file(&self, parent: Option<NodeId>, name: &str, content: &str) -> VfsResult<Written> {
        match self.store.find_child(&self.owner, parent, name)? {
            Some(existing) if existing.is_dir() => Err(VfsError::NameConflict(name.to_string())),
            Some(existing) => {
                if !self.store.update_content(existing.id, content)? {
                    return Err(VfsError::NotFound(name.to_string()));
                }
                Ok(Written::Updated(existing.id))
            }
            None => {
                let id = self
                    .store
                    .create(&self.owner, parent, name, NodeKind::File, Some(content))?;
                Ok(Written::Created(id))
            }
        }
    }

    /// Removes a file or an empty directory.
    pub fn rm(&mut self, path: &str) -> VfsResult<()> {
        let (id, resolved) = self.resolve_removable(path)?;
        let node = self.load(id, &resolved)?;
        if node.is_dir() && !self.store.children(&self.owner, Some(id))?.is_empty() {
            return Err(VfsError::DirectoryNotEmpty(resolved));
        }

        self.store.delete_subtree(id)?;
        info!("{}: removed {}", self.owner, resolved);
        self.refresh_position()?;
        Ok(())
    }

    /// Removes a node and everything below it. Returns the number of nodes removed.
    pub fn rm_recursive(&mut self, path: &str) -> VfsResult<usize> {
        let (id, resolved) = self.resolve_removable(path)?;
        let removed = self.store.delete_subtree(id)?;
        if removed == 0 {
            return Err(VfsError::NotFound(resolved));
        }

        info!("{}: removed {} ({} nodes)", self.owner, resolved, removed);
        self.refresh_position()?;
        Ok(removed)
    }

    /// Renames `src` within its own directory.
    ///
    /// Moving into another directory is not supported.
    pub fn mv(&mut self, src: &str, dst: &str) -> VfsResult<()> {
        let (node, resolved) = self.resolve_existing(src)?;
        let Some(id) = node else {
            return Err(VfsError::NotFound(resolved));
        };

        if dst.contains('/') {
            return Err(VfsError::Unsupported(format!(
                "cannot move {} to {}: cross-directory move",
                src, dst
            )));
        }
        validate_name(dst)?;

        if !self.store.rename(id, dst)? {
            return Err(VfsError::NotFound(resolved));
        }

        info!("{}: renamed {} -> {}", self.owner, resolved, dst);
        self.refresh_position()?;
        Ok(())
    }

    // --------------------
    // Saved position
    // --------------------

    /// Records the current directory in the store.
    pub fn save_position(&self) -> VfsResult<()> {
        Ok(self.store.save_position(&self.owner, &self.cwd)?)
    }

    /// Moves back to the directory saved by a previous session, if any.
    pub fn resume(&mut self) -> VfsResult<&str> {
        if let Some(path) = self.store.load_position(&self.owner)? {
            self.restore(&path);
        }
        Ok(&self.cwd)
    }

    // --------------------
    // First session
    // --------------------

    /// Whether the owner has nothing at the root yet.
    pub fn is_fresh(&self) -> VfsResult<bool> {
        Ok(!self.store.has_root_nodes(&self.owner)?)
    }

    /// Creates the default top-level layout for a new user.
    ///
    /// Fails with `AlreadyExists` when called on an initialised tree.
    pub fn init_default_structure(&self) -> VfsResult<()> {
        for dir in DEFAULT_DIRECTORIES {
            self.store
                .create(&self.owner, None, dir, NodeKind::Directory, None)?;
        }
        self.store.create(
            &self.owner,
            None,
            WELCOME_FILE,
            NodeKind::File,
            Some(WELCOME_TEXT),
        )?;

        info!("{}: initialised default structure", self.owner);
        Ok(())
    }

    // --------------------
    // Helpers
    // --------------------

    fn resolve(&self, path: &str) -> VfsResult<Resolution> {
        Ok(resolve(
            self.store.as_ref(),
            &self.owner,
            self.current,
            &self.cwd,
            path,
        )?)
    }

    /// Resolves a path that must exist.
    fn resolve_existing(&self, path: &str) -> VfsResult<(Option<NodeId>, String)> {
        match self.resolve(path)? {
            Resolution::Found { node, path } => Ok((node, path)),
            Resolution::Missing { path } => Err(VfsError::NotFound(path)),
        }
    }

    /// Resolves a deletion target; the root can never be one.
    fn resolve_removable(&self, path: &str) -> VfsResult<(NodeId, String)> {
        match self.resolve_existing(path)? {
            (Some(id), resolved) => Ok((id, resolved)),
            (None, _) => Err(VfsError::RootProtected),
        }
    }

    fn load(&self, id: NodeId, path: &str) -> VfsResult<Node> {
        self.store
            .get(id)?
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    fn child_path(&self, name: &str) -> String {
        if self.cwd == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", self.cwd, name)
        }
    }

    /// Rebuilds the current path from the store after a rename or delete.
    ///
    /// Falls back to the root if the current directory no longer exists.
    fn refresh_position(&mut self) -> VfsResult<()> {
        let mut components = Vec::new();
        let mut cursor = self.current;
        while let Some(id) = cursor {
            match self.store.get(id)? {
                Some(node) => {
                    components.push(node.name);
                    cursor = node.parent;
                }
                None => {
                    warn!(
                        "{}: working directory {} was removed, returning to /",
                        self.owner, self.cwd
                    );
                    self.current = None;
                    self.cwd = "/".to_string();
                    return Ok(());
                }
            }
        }
        components.reverse();
        self.cwd = render_path(&components);
        Ok(())
    }
}
