//! Configuration management for RAX VFS
//!
//! Layers built-in defaults, an optional `config.toml`, and `RAX_VFS_*`
//! environment variables (nested keys separated by `__`, e.g.
//! `RAX_VFS_SERVER__PORT=2424`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use crate::session::{DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH};

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VfsConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,

    /// Username -> password
    #[serde(default)]
    pub users: HashMap<String, String>,
}

/// Network and per-connection limits
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// IP address to bind the command listener
    pub bind_address: String,

    /// Listener port; 0 picks a free port
    pub port: u16,

    /// Maximum concurrent logged-in sessions
    pub max_clients: usize,

    /// Maximum command line length in bytes
    pub max_command_length: usize,

    pub max_username_length: usize,

    /// Default depth for TREE without an argument
    pub tree_depth: usize,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,

    /// SQLite database file (ignored by the memory backend)
    pub database_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 2323,
            max_clients: 10,
            max_command_length: 4096,
            max_username_length: 32,
            tree_depth: DEFAULT_TREE_DEPTH,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_path: "data/vfs.db".to_string(),
        }
    }
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            users: HashMap::new(),
        }
    }
}

impl VfsConfig {
    /// Load configuration from `path` (without extension) with environment overrides.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let server = ServerSettings::default();
        let storage = StorageSettings::default();

        let settings = Config::builder()
            .set_default("server.bind_address", server.bind_address)?
            .set_default("server.port", server.port as i64)?
            .set_default("server.max_clients", server.max_clients as i64)?
            .set_default("server.max_command_length", server.max_command_length as i64)?
            .set_default("server.max_username_length", server.max_username_length as i64)?
            .set_default("server.tree_depth", server.tree_depth as i64)?
            .set_default("storage.backend", "sqlite")?
            .set_default("storage.database_path", storage.database_path)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("RAX_VFS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: VfsConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.server.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.server.max_command_length == 0 {
            return Err(ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        if self.server.max_username_length == 0 {
            return Err(ConfigError::Message(
                "max_username_length must be greater than 0".into(),
            ));
        }

        if self.server.tree_depth == 0 || self.server.tree_depth > MAX_TREE_DEPTH {
            return Err(ConfigError::Message(format!(
                "tree_depth must be between 1 and {}",
                MAX_TREE_DEPTH
            )));
        }

        if self.storage.backend == StorageBackend::Sqlite && self.storage.database_path.is_empty()
        {
            return Err(ConfigError::Message(
                "database_path cannot be empty for the sqlite backend".into(),
            ));
        }

        Ok(())
    }
}

impl ServerSettings {
    /// Get bind address and port as a socket address string
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = VfsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.listen_address(), "127.0.0.1:2323");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vfs.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 4000
tree_depth = 5

[storage]
backend = "memory"

[users]
alice = "secret"
"#
        )
        .unwrap();

        let config = VfsConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.tree_depth, 5);
        assert_eq!(config.server.max_clients, 10);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.users.get("alice").map(String::as_str), Some("secret"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let config = VfsConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_rejects_zero_clients() {
        let mut config = VfsConfig::default();
        config.server.max_clients = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unbounded_tree_depth() {
        let mut config = VfsConfig::default();
        config.server.tree_depth = MAX_TREE_DEPTH + 1;
        assert!(config.validate().is_err());

        config.server.tree_depth = MAX_TREE_DEPTH;
        assert!(config.validate().is_ok());
    }
}
