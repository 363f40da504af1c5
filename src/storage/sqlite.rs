//! SQLite node store.
//!
//! One `nodes` table. The root is the sentinel `parent_id = 0` rather than
//! `NULL`, so `UNIQUE(owner, parent_id, name)` also covers root-level names.

use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use std::path::Path;

use crate::error::StoreError;
use crate::storage::node::{Node, NodeId, NodeKind, now_millis};
use crate::storage::store::NodeStore;

const ROOT_SENTINEL: i64 = 0;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner TEXT NOT NULL,
    parent_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    is_directory INTEGER NOT NULL,
    content TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE(owner, parent_id, name)
);
CREATE INDEX IF NOT EXISTS idx_nodes_owner_parent ON nodes(owner, parent_id);

CREATE TABLE IF NOT EXISTS user_state (
    owner TEXT PRIMARY KEY,
    current_path TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;

const NODE_COLUMNS: &str =
    "id, owner, parent_id, name, is_directory, content, created_at, updated_at";

fn parent_column(parent: Option<NodeId>) -> i64 {
    parent.map(|p| p.0).unwrap_or(ROOT_SENTINEL)
}

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    let parent_id: i64 = row.get(2)?;
    let is_directory: bool = row.get(4)?;
    Ok(Node {
        id: NodeId(row.get(0)?),
        owner: row.get(1)?,
        parent: (parent_id != ROOT_SENTINEL).then_some(NodeId(parent_id)),
        name: row.get(3)?,
        kind: if is_directory {
            NodeKind::Directory
        } else {
            NodeKind::File
        },
        content: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Turns a UNIQUE violation into [`StoreError::Conflict`].
fn map_unique(err: rusqlite::Error, name: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict(name.to_string())
        }
        _ => StoreError::Sqlite(err),
    }
}

/// Database handle for node persistence.
///
/// The connection sits behind a mutex, so every statement (and the delete
/// transaction) runs with exclusive access.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        info!("Opened node database at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl NodeStore for SqliteStore {
    fn create(
        &self,
        owner: &str,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
        content: Option<&str>,
    ) -> Result<NodeId, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let now = now_millis();
        let content = match kind {
            NodeKind::File => Some(content.unwrap_or_default()),
            NodeKind::Directory => None,
        };

        if let Some(parent_id) = parent {
            let is_directory: Option<bool> = tx
                .query_row(
                    "SELECT is_directory FROM nodes WHERE id = ?1 AND owner = ?2",
                    params![parent_id.0, owner],
                    |row| row.get(0),
                )
                .optional()?;
            match is_directory {
                None => return Err(StoreError::MissingParent(parent_id)),
                Some(false) => return Err(StoreError::ParentNotDirectory(parent_id)),
                Some(true) => {}
            }
        }

        tx.execute(
            "INSERT INTO nodes (owner, parent_id, name, is_directory, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![owner, parent_column(parent), name, kind.is_dir(), content, now],
        )
        .map_err(|e| map_unique(e, name))?;

        let id = NodeId(tx.last_insert_rowid());
        tx.commit()?;
        debug!("sqlite store: created {:?} {} for {}", kind, id, owner);
        Ok(id)
    }

    fn get(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        let conn = self.conn.lock();
        let node = conn
            .query_row(
                &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?1"),
                params![id.0],
                node_from_row,
            )
            .optional()?;
        Ok(node)
    }

    fn find_child(
        &self,
        owner: &str,
        parent: Option<NodeId>,
        name: &str,
    ) -> Result<Option<Node>, StoreError> {
        let conn = self.conn.lock();
        let node = conn
            .query_row(
                &format!(
                    "SELECT {NODE_COLUMNS} FROM nodes
                     WHERE owner = ?1 AND parent_id = ?2 AND name = ?3"
                ),
                params![owner, parent_column(parent), name],
                node_from_row,
            )
            .optional()?;
        Ok(node)
    }

    fn children(&self, owner: &str, parent: Option<NodeId>) -> Result<Vec<Node>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes
             WHERE owner = ?1 AND parent_id = ?2
             ORDER BY is_directory DESC, name ASC"
        ))?;

        let rows = stmt.query_map(params![owner, parent_column(parent)], node_from_row)?;
        let children = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(children)
    }

    fn update_content(&self, id: NodeId, content: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE nodes SET content = ?1, updated_at = ?2
             WHERE id = ?3 AND is_directory = 0",
            params![content, now_millis(), id.0],
        )?;
        Ok(changed > 0)
    }

    fn rename(&self, id: NodeId, new_name: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE nodes SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![new_name, now_millis(), id.0],
            )
            .map_err(|e| map_unique(e, new_name))?;
        Ok(changed > 0)
    }

    fn delete_subtree(&self, id: NodeId) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let exists: Option<i64> = tx
            .query_row("SELECT id FROM nodes WHERE id = ?1", params![id.0], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Ok(0);
        }

        // Walk down level by level, then remove everything in the same transaction.
        let mut doomed = vec![id.0];
        let mut cursor = 0;
        {
            let mut stmt = tx.prepare("SELECT id FROM nodes WHERE parent_id = ?1")?;
            while cursor < doomed.len() {
                let current = doomed[cursor];
                cursor += 1;
                let ids = stmt
                    .query_map(params![current], |row| row.get::<_, i64>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                doomed.extend(ids);
            }
        }

        {
            let mut stmt = tx.prepare("DELETE FROM nodes WHERE id = ?1")?;
            for victim in &doomed {
                stmt.execute(params![victim])?;
            }
        }
        tx.commit()?;

        debug!("sqlite store: deleted subtree {} ({} nodes)", id, doomed.len());
        Ok(doomed.len())
    }

    fn save_position(&self, owner: &str, path: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO user_state (owner, current_path, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(owner) DO UPDATE SET
                current_path = excluded.current_path,
                updated_at = excluded.updated_at",
            params![owner, path, now_millis()],
        )?;
        Ok(())
    }

    fn load_position(&self, owner: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock();
        let path = conn
            .query_row(
                "SELECT current_path FROM user_state WHERE owner = ?1",
                params![owner],
                |row| row.get(0),
            )
            .optional()?;
        Ok(path)
    }

    fn has_root_nodes(&self, owner: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM nodes WHERE owner = ?1 AND parent_id = ?2",
            params![owner, ROOT_SENTINEL],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
