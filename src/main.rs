//! RAX VFS Server - Entry Point
//!
//! Serves a per-user virtual file system over a line-based TCP protocol.

use log::info;
use std::process;

use rax_vfs::config::{DEFAULT_CONFIG_PATH, VfsConfig};
use rax_vfs::error::RaxVfsError;
use rax_vfs::error::handlers::handle_error;
use rax_vfs::{Server, storage};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    if let Err(e) = run().await {
        handle_error(&e);
        process::exit(1);
    }
}

async fn run() -> Result<(), RaxVfsError> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = VfsConfig::load(&config_path)?;
    info!(
        "Launching VFS server with {:?} storage ({} users configured)",
        config.storage.backend,
        config.users.len()
    );

    let store = storage::open_store(&config.storage)?;
    let server = Server::bind(config, store).await?;
    server.start().await;
    Ok(())
}
