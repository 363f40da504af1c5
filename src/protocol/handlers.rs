//! Command handlers
//!
//! Handler functions for every command: authentication, navigation, and file
//! operations. Each handler maps a session call onto a `CommandResult`.

use log::{info, warn};

use crate::auth::{self, CredentialStore};
use crate::client::Client;
use crate::error::VfsError;
use crate::error::handlers::{auth_reply_code, reply_code};
use crate::protocol::responses::{
    ACTION_NOT_TAKEN, BAD_ARGUMENTS, GOODBYE, NOT_LOGGED_IN, OK, PASSWORD_REQUIRED,
    UNKNOWN_COMMAND,
};
use crate::protocol::{Command, CommandResult};
use crate::session::{VfsSession, Written};
use crate::storage::Node;

const EMPTY_DIRECTORY: &str = "(empty directory)";
const EMPTY_FILE: &str = "(empty file)";

const HELP_LINES: &[&str] = &[
    "USER <name> / PASS <password>  log in",
    "WHOAMI                         show the current user",
    "PWD                            show the current directory",
    "CD [path]                      change directory (no path: go to /)",
    "LS [path]                      list a directory",
    "MKDIR <name>                   create a directory",
    "TOUCH <name>                   create an empty file",
    "CAT <path>                     show a file",
    "WRITE <path> <content>         write a file",
    "RM [-r] <path>                 remove a file or directory",
    "MV <src> <dst>                 rename within the same directory",
    "TREE [depth]                   show the directory tree",
    "QUIT                           disconnect",
];

/// Settings handlers need from the server.
pub struct HandlerContext<'a> {
    pub credentials: &'a CredentialStore,
    pub tree_depth: usize,
}

/// Dispatches a command from a logged-in client to its handler.
pub fn handle_command(client: &mut Client, command: &Command, ctx: &HandlerContext) -> CommandResult {
    match command {
        Command::Quit => handle_cmd_quit(client),
        Command::Help => handle_cmd_help(),
        Command::Whoami => handle_cmd_whoami(client),
        Command::User(_) | Command::Pass(_) => {
            CommandResult::failure(ACTION_NOT_TAKEN, "Already logged in")
        }
        Command::Usage(usage) => CommandResult::failure(BAD_ARGUMENTS, *usage),
        Command::Unknown(raw) => handle_cmd_unknown(raw),
        _ => match client.session_mut() {
            Some(session) => handle_vfs_command(session, command, ctx),
            None => CommandResult::failure(NOT_LOGGED_IN, "Not logged in"),
        },
    }
}

/// Handles commands before login: only USER, PASS, HELP and QUIT are accepted.
///
/// A successful PASS marks the client logged in; the caller still has to
/// register the session and attach the user's tree.
pub fn handle_auth_command(client: &mut Client, command: &Command, ctx: &HandlerContext) -> CommandResult {
    match command {
        Command::User(username) => handle_cmd_user(client, username, ctx.credentials),
        Command::Pass(password) => handle_cmd_pass(client, password, ctx.credentials),
        Command::Quit => handle_cmd_quit(client),
        Command::Help => handle_cmd_help(),
        Command::Usage(usage) => CommandResult::failure(BAD_ARGUMENTS, *usage),
        _ => CommandResult::failure(NOT_LOGGED_IN, "Please login with USER and PASS"),
    }
}

fn handle_vfs_command(session: &mut VfsSession, command: &Command, ctx: &HandlerContext) -> CommandResult {
    let result = match command {
        Command::Pwd => Ok(CommandResult::success(OK, session.pwd())),
        Command::Cd(path) => session
            .cd(path.as_deref().unwrap_or(""))
            .map(|cwd| CommandResult::success(OK, cwd)),
        Command::Ls(path) => session.ls(path.as_deref()).map(render_listing),
        Command::Mkdir(name) => session
            .mkdir(name)
            .map(|_| CommandResult::success(OK, format!("Directory created: {}", name))),
        Command::Touch(name) => session.touch(name, "").map(|w| written_reply(w, name)),
        Command::Cat(path) => session.cat(path).map(render_content),
        Command::Write { path, content } => {
            session.write(path, content).map(|w| written_reply(w, path))
        }
        Command::Rm {
            path,
            recursive: false,
        } => session
            .rm(path)
            .map(|_| CommandResult::success(OK, format!("Removed: {}", path))),
        Command::Rm {
            path,
            recursive: true,
        } => session.rm_recursive(path).map(|count| {
            CommandResult::success(OK, format!("Removed: {} ({} entries)", path, count))
        }),
        Command::Mv { src, dst } => session
            .mv(src, dst)
            .map(|_| CommandResult::success(OK, format!("Renamed: {} -> {}", src, dst))),
        Command::Tree(depth) => {
            let depth = depth.unwrap_or(ctx.tree_depth);
            session.tree(depth).map(|lines| {
                let mut data = vec![session.pwd().to_string()];
                if lines.is_empty() {
                    data.push(EMPTY_DIRECTORY.to_string());
                }
                data.extend(lines.into_iter().map(|l| {
                    if l.kind.is_dir() {
                        format!("{}/", l.line)
                    } else {
                        l.line
                    }
                }));
                CommandResult::success(OK, "End of tree").with_data(data)
            })
        }
        other => return handle_cmd_unknown(&format!("{:?}", other)),
    };

    result.unwrap_or_else(|e| vfs_failure(session.owner(), &e))
}

fn vfs_failure(owner: &str, err: &VfsError) -> CommandResult {
    match err {
        VfsError::Storage(_) => warn!("{}: {}", owner, err),
        _ => info!("{}: command failed ({}): {}", owner, err.kind(), err),
    }
    CommandResult::failure(reply_code(err), err.to_string())
}

fn written_reply(written: Written, name: &str) -> CommandResult {
    match written {
        Written::Created(_) => CommandResult::success(OK, format!("File created: {}", name)),
        Written::Updated(_) => CommandResult::success(OK, format!("File updated: {}", name)),
    }
}

fn render_listing(nodes: Vec<Node>) -> CommandResult {
    if nodes.is_empty() {
        return CommandResult::success(OK, "0 entries")
            .with_data(vec![EMPTY_DIRECTORY.to_string()]);
    }
    let count = nodes.len();
    let data = nodes
        .into_iter()
        .map(|n| if n.is_dir() { format!("{}/", n.name) } else { n.name })
        .collect();
    CommandResult::success(OK, format!("{} entries", count)).with_data(data)
}

fn render_content(content: String) -> CommandResult {
    let data = if content.is_empty() {
        vec![EMPTY_FILE.to_string()]
    } else {
        content.lines().map(str::to_string).collect()
    };
    CommandResult::success(OK, "End of file").with_data(data)
}

/// Handles the QUIT command: logs out the client and signals connection close.
fn handle_cmd_quit(client: &mut Client) -> CommandResult {
    client.logout();
    CommandResult::close(GOODBYE, "Goodbye")
}

fn handle_cmd_help() -> CommandResult {
    CommandResult::success(OK, "End of help")
        .with_data(HELP_LINES.iter().map(|l| l.to_string()).collect())
}

fn handle_cmd_whoami(client: &Client) -> CommandResult {
    match client.username() {
        Some(name) if client.is_logged_in() => CommandResult::success(OK, name.as_str()),
        _ => CommandResult::failure(NOT_LOGGED_IN, "Not logged in"),
    }
}

/// Handles the USER command: validates username and sets client state accordingly.
fn handle_cmd_user(client: &mut Client, username: &str, credentials: &CredentialStore) -> CommandResult {
    match auth::validate_user(username, credentials) {
        Ok(()) => {
            client.set_user_valid(true);
            client.set_logged_in(false);
            client.set_username(Some(username.to_string()));
            CommandResult::success(PASSWORD_REQUIRED, "Password required")
        }
        Err(e) => {
            client.set_user_valid(false);
            client.set_logged_in(false);
            client.set_username(None);
            CommandResult::failure(auth_reply_code(&e), e.to_string())
        }
    }
}

/// Handles the PASS command: validates password if username was previously validated.
fn handle_cmd_pass(client: &mut Client, password: &str, credentials: &CredentialStore) -> CommandResult {
    if client.is_user_valid() {
        if let Some(username) = client.username().cloned() {
            return match auth::validate_password(&username, password, credentials) {
                Ok(()) => {
                    client.set_logged_in(true);
                    CommandResult::success(OK, "Password accepted")
                }
                Err(e) => {
                    client.set_logged_in(false);
                    CommandResult::failure(auth_reply_code(&e), e.to_string())
                }
            };
        }
    }
    // Username not set or invalid
    CommandResult::failure(NOT_LOGGED_IN, "Please enter the username first")
}

fn handle_cmd_unknown(raw: &str) -> CommandResult {
    CommandResult::failure(UNKNOWN_COMMAND, format!("Unknown command: {}", raw))
}
