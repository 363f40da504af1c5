//! Reply handling
//!
//! Defines reply codes and the wire formatting of command results.

use crate::protocol::CommandResult;

pub const OK: u16 = 200;
pub const READY: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const LOGIN_SUCCESS: u16 = 230;
pub const PASSWORD_REQUIRED: u16 = 331;
pub const SERVICE_UNAVAILABLE: u16 = 421;
pub const DIRECTORY_NOT_EMPTY: u16 = 450;
pub const LOCAL_ERROR: u16 = 451;
pub const UNKNOWN_COMMAND: u16 = 500;
pub const BAD_ARGUMENTS: u16 = 501;
pub const NOT_IMPLEMENTED: u16 = 502;
pub const NOT_LOGGED_IN: u16 = 530;
pub const ACTION_NOT_TAKEN: u16 = 550;
pub const NAME_EXISTS: u16 = 553;

/// Format a single-line reply
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Format a result: payload lines as `<code>-<line>`, then the final `<code> <message>`.
pub fn render(result: &CommandResult) -> String {
    let mut out = String::new();
    for line in &result.data {
        out.push_str(&format!("{}-{}\r\n", result.code, line));
    }
    out.push_str(&format_response(result.code, &result.message));
    out
}
