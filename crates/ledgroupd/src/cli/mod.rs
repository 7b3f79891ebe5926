//! CLI subcommands — group listing, service status, group transitions.

mod groups;
mod status;
mod transition;

use std::path::Path;

use clap::Subcommand;
use serde::{Deserialize, Serialize};

pub(super) use ledgroupd_lib::control::{self, Response};
pub(super) use ledgroupd_lib::error::{LedgroupdError, Result};

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{key:<width$}{value}", width = w);
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Send one request line to the service, turning an `err` reply into a
/// [`LedgroupdError::Service`].
pub(super) fn request(socket: &Path, line: &str) -> Result<Option<String>> {
    match control::send_request(socket, line)? {
        Response::Ok(payload) => Ok(payload),
        Response::Err(msg) => Err(LedgroupdError::Service(msg)),
    }
}

/// Decode a JSON payload from a service reply.
pub(super) fn parse_payload<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T> {
    serde_json::from_str(payload)
        .map_err(|e| LedgroupdError::Service(format!("malformed service payload: {e}")))
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct GroupsOutput {
    pub count: usize,
    pub groups: Vec<GroupJson>,
}

#[derive(Serialize)]
pub(super) struct GroupJson {
    pub name: String,
    pub members: Vec<MemberJson>,
}

#[derive(Serialize)]
pub(super) struct MemberJson {
    pub name: String,
    pub action: String,
    pub duty_on: u8,
    pub period: u16,
    pub priority: String,
}

/// Service `status` payload, as emitted by the service.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct StatusOutput {
    pub asserted: Vec<String>,
    pub pending: Vec<String>,
    pub settled: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List known LED groups and their members
    Groups {
        /// Read this JSON group config directly instead of asking the service
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },

    /// Show asserted groups and hardware convergence state
    Status,

    /// Assert a group (its LEDs join the arbitration)
    Assert {
        /// Group name from the loaded config
        group: String,
    },

    /// De-assert a group
    Deassert {
        /// Group name from the loaded config
        group: String,
    },

    /// De-assert every currently asserted group
    ClearAll,
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, socket: &Path, json: bool) -> Result<()> {
    match cmd {
        Command::Groups { config } => groups::cmd_groups(config, socket, json),
        Command::Status => status::cmd_status(socket, json),
        Command::Assert { group } => {
            if json {
                warn_json_unsupported("assert");
            }
            transition::cmd_transition(socket, &group, true)
        }
        Command::Deassert { group } => {
            if json {
                warn_json_unsupported("deassert");
            }
            transition::cmd_transition(socket, &group, false)
        }
        Command::ClearAll => {
            if json {
                warn_json_unsupported("clear-all");
            }
            transition::cmd_clear_all(socket)
        }
    }
}
