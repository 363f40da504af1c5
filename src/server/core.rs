use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::auth::CredentialStore;
use crate::client::{Client, SessionRegistry, handle_client};
use crate::config::VfsConfig;
use crate::error::VfsError;
use crate::protocol::handlers::HandlerContext;
use crate::protocol::responses::{
    self, LOGIN_SUCCESS, NOT_LOGGED_IN, READY, SERVICE_UNAVAILABLE, UNKNOWN_COMMAND,
};
use crate::protocol::{CommandResult, CommandStatus, handle_auth_command, parse_command};
use crate::session::VfsSession;
use crate::storage::NodeStore;

/// Everything a connection task needs, shared read-only across tasks.
pub struct ServerContext {
    pub config: VfsConfig,
    pub credentials: CredentialStore,
    pub store: Arc<dyn NodeStore>,
}

pub struct Server {
    registry: Arc<Mutex<SessionRegistry>>,
    listener: TcpListener,
    context: Arc<ServerContext>,
}

impl Server {
    /// Binds the listener described by `config`, serving trees from `store`.
    pub async fn bind(config: VfsConfig, store: Arc<dyn NodeStore>) -> std::io::Result<Self> {
        let address = config.server.listen_address();
        let listener = TcpListener::bind(&address).await?;
        info!("Server bound to {}", listener.local_addr()?);

        let credentials = CredentialStore::new(
            config.users.clone(),
            config.server.max_username_length,
        );
        if credentials.is_empty() {
            warn!("No users configured; nobody will be able to log in");
        }

        Ok(Self {
            registry: Arc::new(Mutex::new(SessionRegistry::new(config.server.max_clients))),
            listener,
            context: Arc::new(ServerContext {
                config,
                credentials,
                store,
            }),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(self) {
        info!(
            "Starting RAX VFS server on {} (max {} clients)",
            self.context.config.server.listen_address(),
            self.context.config.server.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let registry = Arc::clone(&self.registry);
                    let context = Arc::clone(&self.context);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_new_client(stream, addr, registry, context).await {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, result: &CommandResult) -> std::io::Result<()> {
    writer.write_all(responses::render(result).as_bytes()).await?;
    writer.flush().await
}

/// Sends the login reply, giving the registry slot back if the client is already gone.
async fn send_login_reply<W: AsyncWrite + Unpin>(
    writer: &mut W,
    reply: &CommandResult,
    client: &Client,
    registry: &Mutex<SessionRegistry>,
) -> std::io::Result<()> {
    if let Err(e) = send(writer, reply).await {
        // The slot was claimed in login(); nobody else will free it
        if reply.status == CommandStatus::Success {
            if let Some(username) = client.username() {
                registry.lock().await.release(username);
            }
        }
        return Err(e);
    }
    Ok(())
}

/// Handles a new client: greets, authenticates, registers, and hands off to the session handler.
async fn handle_new_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    registry: Arc<Mutex<SessionRegistry>>,
    context: Arc<ServerContext>,
) -> Result<(), std::io::Error> {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    send(
        &mut writer,
        &CommandResult::success(READY, "Welcome to RAX VFS Server"),
    )
    .await?;

    let mut client = Client::default();
    client.set_client_addr(Some(client_addr));

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "Client disconnected during authentication",
            ));
        }

        if line.len() > context.config.server.max_command_length {
            send(
                &mut writer,
                &CommandResult::failure(UNKNOWN_COMMAND, "Command too long"),
            )
            .await?;
            continue;
        }

        let command = parse_command(line.trim_end_matches(['\r', '\n']));
        let result = {
            let ctx = HandlerContext {
                credentials: &context.credentials,
                tree_depth: context.config.server.tree_depth,
            };
            handle_auth_command(&mut client, &command, &ctx)
        };

        if !client.is_logged_in() {
            send(&mut writer, &result).await?;
            if result.status == CommandStatus::CloseConnection {
                return Ok(());
            }
            continue;
        }

        let reply = login(&mut client, client_addr, &registry, &context).await;
        send_login_reply(&mut writer, &reply, &client, &registry).await?;
        match reply.status {
            CommandStatus::Success => break,
            CommandStatus::CloseConnection => return Ok(()),
            CommandStatus::Failure(_) => continue,
        }
    }

    // Hand off to session handler
    handle_client(reader, writer, client, registry, context).await;
    Ok(())
}

/// Registers an authenticated client and attaches their tree.
///
/// A brand-new tree gets the default layout; a returning user is put back in
/// the directory they last used, as recorded by the store.
async fn login(
    client: &mut Client,
    client_addr: SocketAddr,
    registry: &Arc<Mutex<SessionRegistry>>,
    context: &ServerContext,
) -> CommandResult {
    let Some(username) = client.username().cloned() else {
        client.logout();
        return CommandResult::failure(NOT_LOGGED_IN, "Please enter the username first");
    };

    {
        let mut sessions = registry.lock().await;

        if sessions.is_full() {
            client.logout();
            return CommandResult::close(
                SERVICE_UNAVAILABLE,
                "Too many connections. Try again later.",
            );
        }

        if let Err(e) = sessions.register(&username, client_addr) {
            warn!("Refused login for {} from {}: {}", username, client_addr, e);
            client.logout();
            return CommandResult::failure(NOT_LOGGED_IN, e.to_string());
        }

        info!(
            "Authenticated client: {} as {} ({}/{} clients)",
            client_addr,
            username,
            sessions.len(),
            sessions.max_clients()
        );
    }

    let mut session = VfsSession::open(Arc::clone(&context.store), username.clone());
    let mut data = Vec::new();

    match session.is_fresh() {
        Ok(true) => match session.init_default_structure() {
            Ok(()) => data.push("Created the default directory layout".to_string()),
            // Another login got there first
            Err(VfsError::AlreadyExists(_)) => {}
            Err(e) => warn!("Could not initialise tree for {}: {}", username, e),
        },
        Ok(false) => {}
        Err(e) => warn!("Could not inspect tree for {}: {}", username, e),
    }

    if let Err(e) = session.resume() {
        warn!("Could not load last directory for {}: {}", username, e);
    }
    data.push(format!("Working directory: {}", session.pwd()));
    client.attach_session(session);

    CommandResult::success(LOGIN_SUCCESS, format!("Welcome, {}", username)).with_data(data)
}
