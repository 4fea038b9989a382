//! Application orchestrator.
//! Loads and merges config, initializes logging, then runs the chosen subcommand.

use anyhow::{Result, anyhow};
use tracing::{debug, error};

use checkin_control::cli::{Args, Command, sanitize_path};
use checkin_control::config::{ConfigSource, load_config, resolve_config_path};
use checkin_control::output as out;
use checkin_control::{CheckinError, LocalFs, MarkerOutcome, checkin_paths, cleanup};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handled before logging init so nothing else is printed.
    if args.print_config {
        print_config(&args);
        return Ok(());
    }

    let Some(command) = args.command.clone() else {
        return Err(anyhow!("no subcommand given; try `checkin_control --help`"));
    };

    let (mut cfg, source) = load_config(args.config.as_deref())?;
    args.apply_overrides(&mut cfg);

    // Held until the end of `run` so the file appender flushes.
    let _guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), cfg.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;
    debug!(?source, config = ?cfg, "Starting checkin_control");

    let result = match &command {
        Command::Checkin { source, dest, .. } => {
            let mode = command.transfer_mode(&cfg);
            let (src, dst) = (sanitize_path(source), sanitize_path(dest));
            checkin_paths(&src, &dst, mode).map(|done| {
                if let MarkerOutcome::Failed(e) = &done.marker {
                    out::print_warn(&format!("{e}"));
                }
                let host = done.backend.root().join(&done.path);
                out::print_user(&host.display().to_string());
            })
        }
        Command::Cleanup { root, path } => LocalFs::new(sanitize_path(root))
            .map_err(CheckinError::from)
            .and_then(|fs| cleanup(&fs, path))
            .map(|()| out::print_success(&format!("removed {path}"))),
    };

    result.map_err(|e| {
        report(&e);
        anyhow::Error::new(e)
    })
}

fn report(e: &CheckinError) {
    let code = e.code();
    let cause = std::error::Error::source(e).map(|c| c.to_string());
    match e {
        CheckinError::NotFound { backend, path } => {
            error!(code, kind = "not_found", %backend, %path, "Checkin failed")
        }
        CheckinError::NoExistingAncestor(dest) => {
            error!(code, kind = "no_existing_ancestor", dest = %dest.display(), "Checkin failed")
        }
        CheckinError::DestinationUnavailable { backend, path, .. } => {
            error!(code, kind = "destination_unavailable", %backend, %path, ?cause, "Checkin failed")
        }
        CheckinError::TransferFailed { src, dest, .. } => {
            error!(code, kind = "transfer_failed", %src, %dest, ?cause, "Checkin failed")
        }
        CheckinError::CleanupInconsistency { path, top, .. } => {
            error!(code, kind = "cleanup_inconsistency", %path, %top, ?cause, "Cleanup incomplete")
        }
        other => error!(code, error = %other, ?cause, "Operation failed"),
    }
}

fn print_config(args: &Args) {
    match resolve_config_path(args.config.as_deref()) {
        Some((path, true)) => {
            out::print_info(&format!("Using explicit config:\n  {}", path.display()));
            if !path.exists() {
                out::print_warn("That file does not exist; commands will fail until it does.");
            }
        }
        Some((path, false)) => {
            out::print_info(&format!("Default config path:\n  {}", path.display()));
            match load_config(None) {
                Ok((_, ConfigSource::File(_))) => out::print_info("A config file exists at that location."),
                Ok(_) => out::print_info("No config file exists there; built-in defaults apply."),
                Err(e) => out::print_error(&format!("{e:#}")),
            }
        }
        None => out::print_error("Could not determine a default config path."),
    }
}
