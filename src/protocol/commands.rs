//! Module `commands`
//!
//! Defines the command parsing logic and the data structures used to
//! represent commands, their status, and their results.

/// A command parsed from one client line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    User(String),
    Pass(String),
    Whoami,
    Help,
    Quit,
    Pwd,
    Cd(Option<String>),
    Ls(Option<String>),
    Mkdir(String),
    Touch(String),
    Cat(String),
    Write { path: String, content: String },
    Rm { path: String, recursive: bool },
    Mv { src: String, dst: String },
    Tree(Option<usize>),
    /// Known verb with bad arguments; carries the usage string.
    Usage(&'static str),
    Unknown(String),
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Full result of a command: status, reply code, final message, and payload lines.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub code: u16,
    pub message: String,
    pub data: Vec<String>,
}

impl CommandResult {
    pub fn success(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            code,
            message: message.into(),
            data: Vec::new(),
        }
    }

    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: CommandStatus::Failure(message.clone()),
            code,
            message,
            data: Vec::new(),
        }
    }

    pub fn close(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::CloseConnection,
            code,
            message: message.into(),
            data: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: Vec<String>) -> Self {
        self.data = data;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, CommandStatus::Success)
    }
}

const USAGE_USER: &str = "Usage: USER <name>";
const USAGE_PASS: &str = "Usage: PASS <password>";
const USAGE_MKDIR: &str = "Usage: MKDIR <name>";
const USAGE_TOUCH: &str = "Usage: TOUCH <name>";
const USAGE_CAT: &str = "Usage: CAT <path>";
const USAGE_WRITE: &str = "Usage: WRITE <path> <content>";
const USAGE_RM: &str = "Usage: RM [-r] <path>";
const USAGE_MV: &str = "Usage: MV <src> <dst>";
const USAGE_TREE: &str = "Usage: TREE [depth]";

/// Parses a raw line received from a client into a [`Command`].
///
/// The verb is case-insensitive; arguments are split on whitespace, except
/// for `WRITE` whose content is the rest of the line.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let rest = parts.next().unwrap_or("").trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let first = || args.first().map(|s| s.to_string());

    match cmd.as_str() {
        "USER" => first().map(Command::User).unwrap_or(Command::Usage(USAGE_USER)),
        "PASS" => first().map(Command::Pass).unwrap_or(Command::Usage(USAGE_PASS)),
        "WHOAMI" => Command::Whoami,
        "HELP" => Command::Help,
        "QUIT" | "EXIT" => Command::Quit,
        "PWD" => Command::Pwd,
        "CD" => Command::Cd(first()),
        "LS" => Command::Ls(first()),
        "MKDIR" => first().map(Command::Mkdir).unwrap_or(Command::Usage(USAGE_MKDIR)),
        "TOUCH" => first().map(Command::Touch).unwrap_or(Command::Usage(USAGE_TOUCH)),
        "CAT" => first().map(Command::Cat).unwrap_or(Command::Usage(USAGE_CAT)),
        "WRITE" => {
            let mut split = rest.splitn(2, char::is_whitespace);
            match (split.next(), split.next().map(str::trim_start)) {
                (Some(path), Some(content)) if !path.is_empty() && !content.is_empty() => {
                    Command::Write {
                        path: path.to_string(),
                        content: content.to_string(),
                    }
                }
                _ => Command::Usage(USAGE_WRITE),
            }
        }
        "RM" => match args.as_slice() {
            ["-r", path] => Command::Rm {
                path: path.to_string(),
                recursive: true,
            },
            [path] if *path != "-r" => Command::Rm {
                path: path.to_string(),
                recursive: false,
            },
            _ => Command::Usage(USAGE_RM),
        },
        "MV" => match args.as_slice() {
            [src, dst] => Command::Mv {
                src: src.to_string(),
                dst: dst.to_string(),
            },
            _ => Command::Usage(USAGE_MV),
        },
        "TREE" => match args.as_slice() {
            [] => Command::Tree(None),
            [depth] => depth
                .parse()
                .map(|d| Command::Tree(Some(d)))
                .unwrap_or(Command::Usage(USAGE_TREE)),
            _ => Command::Usage(USAGE_TREE),
        },
        _ => Command::Unknown(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("exit"), Command::Quit);
        assert_eq!(parse_command("pwd"), Command::Pwd);
        assert_eq!(parse_command("HELP"), Command::Help);
        assert_eq!(parse_command("ls"), Command::Ls(None));
        assert_eq!(parse_command("cd"), Command::Cd(None));
    }

    #[test]
    fn test_parse_commands_with_args() {
        assert_eq!(
            parse_command("CD /some/path"),
            Command::Cd(Some("/some/path".to_string()))
        );
        assert_eq!(
            parse_command("user alice"),
            Command::User("alice".to_string())
        );
        assert_eq!(
            parse_command("mv a b"),
            Command::Mv {
                src: "a".to_string(),
                dst: "b".to_string()
            }
        );
        assert_eq!(parse_command("tree 2"), Command::Tree(Some(2)));
    }

    #[test]
    fn test_parse_write_keeps_rest_of_line() {
        assert_eq!(
            parse_command("WRITE notes.txt hello   big world"),
            Command::Write {
                path: "notes.txt".to_string(),
                content: "hello   big world".to_string()
            }
        );
        assert_eq!(parse_command("WRITE notes.txt"), Command::Usage(USAGE_WRITE));
    }

    #[test]
    fn test_parse_rm_flags() {
        assert_eq!(
            parse_command("rm -r old"),
            Command::Rm {
                path: "old".to_string(),
                recursive: true
            }
        );
        assert_eq!(
            parse_command("rm old"),
            Command::Rm {
                path: "old".to_string(),
                recursive: false
            }
        );
        assert_eq!(parse_command("rm -r"), Command::Usage(USAGE_RM));
        assert_eq!(parse_command("rm"), Command::Usage(USAGE_RM));
    }

    #[test]
    fn test_missing_arguments() {
        assert_eq!(parse_command("MKDIR"), Command::Usage(USAGE_MKDIR));
        assert_eq!(parse_command("mv a"), Command::Usage(USAGE_MV));
        assert_eq!(parse_command("tree deep"), Command::Usage(USAGE_TREE));
    }

    #[test]
    fn test_unknown_commands() {
        assert_eq!(
            parse_command("FOO bar"),
            Command::Unknown("FOO bar".to_string())
        );
        assert_eq!(parse_command(""), Command::Unknown("".to_string()));
    }
}
