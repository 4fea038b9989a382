//! CLI definition and parsing.
//!
//! Notes:
//! - `--debug` is a shorthand for `--log-level debug` and wins over it.
//! - Logging flags are global, so they may appear before or after the subcommand.
//! - Without `--move`/`--copy`, `checkin` follows `<move>` from the config file.

use clap::{Parser, Subcommand, ValueHint};
use std::path::{Path, PathBuf};

use crate::checkin::TransferMode;
use crate::config::types::{Config, LogLevel};

/// Copy or move files and directory trees into a destination, creating its
/// parent directories as needed.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, value_parser = parse_level)]
    pub log_level: Option<LogLevel>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Append logs to this file as well as stdout.
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Read settings from this XML file instead of the default location.
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print which config file would be used, then exit.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Copy (default) or move SOURCE to DEST.
    Checkin {
        #[arg(value_hint = ValueHint::AnyPath)]
        source: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        dest: PathBuf,
        /// Move instead of copy; a `.checkin` marker is left next to the source.
        #[arg(short = 'm', long = "move", conflicts_with = "copy")]
        move_: bool,
        /// Copy even if the config file asks for moves.
        #[arg(long)]
        copy: bool,
    },
    /// Remove PATH below ROOT and prune its top-level directory.
    Cleanup {
        #[arg(value_hint = ValueHint::DirPath)]
        root: PathBuf,
        path: String,
    },
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    s.parse()
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(file) = &self.log_file {
            cfg.log_file = Some(sanitize_path(file));
        }
        if self.json {
            cfg.json = true;
        }
    }
}

impl Command {
    /// Transfer mode for `checkin`, falling back to the configured default.
    pub fn transfer_mode(&self, cfg: &Config) -> TransferMode {
        match self {
            Command::Checkin { move_: true, .. } => TransferMode::Move,
            Command::Checkin { copy: true, .. } => TransferMode::Copy,
            _ => TransferMode::from_move_flag(cfg.move_by_default),
        }
    }
}

/// Strip one layer of quotes that some shells (PowerShell, cmd) leave on arguments.
pub fn sanitize_path(p: &Path) -> PathBuf {
    let raw = p.to_string_lossy();
    let trimmed = raw.trim();
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
    if quoted {
        PathBuf::from(&trimmed[1..trimmed.len() - 1])
    } else if trimmed.len() == raw.len() {
        p.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::parse_from(["checkin_control", "checkin", "a", "b", "--json", "-d"]);
        assert!(args.json);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn move_and_copy_conflict() {
        assert!(Args::try_parse_from(["checkin_control", "checkin", "a", "b", "--move", "--copy"]).is_err());
    }

    #[test]
    fn quotes_are_stripped() {
        assert_eq!(sanitize_path(Path::new("'/tmp/a b'")), PathBuf::from("/tmp/a b"));
        assert_eq!(sanitize_path(Path::new("\"x\"")), PathBuf::from("x"));
        assert_eq!(sanitize_path(Path::new("plain")), PathBuf::from("plain"));
    }
}
