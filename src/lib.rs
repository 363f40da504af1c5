pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod navigate;
pub mod protocol;
pub mod server;
pub mod session;
pub mod storage;

pub use self::config::VfsConfig;
pub use server::Server;
pub use session::VfsSession;
