use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::client::{Client, SessionRegistry};
use crate::protocol::handlers::HandlerContext;
use crate::protocol::responses::{self, UNKNOWN_COMMAND};
use crate::protocol::{Command, CommandResult, CommandStatus, handle_command, parse_command};
use crate::server::ServerContext;

/// Handles a logged-in client session using Tokio async runtime.
///
/// - Reads command lines from the client until QUIT or disconnect.
/// - Runs each command on the blocking pool, since the store may hit disk.
/// - Releases the user's registry slot on exit.
pub async fn handle_client(
    mut reader: BufReader<OwnedReadHalf>,
    mut writer: OwnedWriteHalf,
    mut client: Client,
    registry: Arc<Mutex<SessionRegistry>>,
    context: Arc<ServerContext>,
) {
    let client_addr = client
        .client_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let username = client.username().cloned().unwrap_or_default();
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                // Client closed the connection
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(_) => {
                // Enforce command length limit
                if line.len() > context.config.server.max_command_length {
                    let reply = responses::format_response(UNKNOWN_COMMAND, "Command too long");
                    if writer.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                    continue;
                }

                let command = parse_command(line.trim_end_matches(['\r', '\n']));
                info!("Received from {} ({}): {:?}", client_addr, username, &command);

                let ctx = Arc::clone(&context);
                let joined = tokio::task::spawn_blocking(move || {
                    let result = execute(&mut client, &command, &ctx);
                    (client, result)
                })
                .await;
                let result = match joined {
                    Ok((returned, result)) => {
                        client = returned;
                        result
                    }
                    Err(e) => {
                        error!("Command task for {} failed: {}", client_addr, e);
                        break;
                    }
                };

                let reply = responses::render(&result);
                if let Err(e) = writer.write_all(reply.as_bytes()).await {
                    error!("Failed to write to {}: {}", client_addr, e);
                    break;
                }

                match result.status {
                    CommandStatus::CloseConnection => {
                        info!("Client {} requested to quit", client_addr);
                        break;
                    }
                    CommandStatus::Failure(reason) => {
                        debug!("Command from {} failed: {}", client_addr, reason);
                    }
                    CommandStatus::Success => {}
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    registry.lock().await.release(&username);
    info!("Client {} ({}) disconnected", client_addr, username);
}

/// Runs one command and saves the working directory whenever it moved.
fn execute(client: &mut Client, command: &Command, context: &ServerContext) -> CommandResult {
    let handler_ctx = HandlerContext {
        credentials: &context.credentials,
        tree_depth: context.config.server.tree_depth,
    };

    let before = client.session().map(|s| s.pwd().to_string());
    let result = handle_command(client, command, &handler_ctx);

    if let Some(session) = client.session() {
        if before.as_deref() != Some(session.pwd()) {
            if let Err(e) = session.save_position() {
                warn!("Could not save position for {}: {}", session.owner(), e);
            }
        }
    }
    result
}
