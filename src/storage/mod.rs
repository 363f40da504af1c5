//! Node storage
//!
//! The store contract plus its in-memory and SQLite backends.

pub mod memory;
pub mod node;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageSettings};
use crate::error::StoreError;

pub use memory::MemoryStore;
pub use node::{Node, NodeId, NodeKind};
pub use sqlite::SqliteStore;
pub use store::NodeStore;

/// Opens the backend selected in the configuration.
pub fn open_store(settings: &StorageSettings) -> Result<Arc<dyn NodeStore>, StoreError> {
    match settings.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&settings.database_path)?)),
    }
}
