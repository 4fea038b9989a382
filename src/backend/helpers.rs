//! I/O helper utilities.
//!
//! Provides small adapters to enrich io::Error with actionable context/hints,
//! usable with map_err in both BackendResult and io::Result code paths.
//!
//! Usage:
//!   // in functions returning BackendResult<_>
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create dir", dir))?;
//!
//!   // in functions returning io::Result<_>
//!   File::open(p).map_err(io_error_with_help_io("open file", p))?;

use std::io;
use std::path::Path;

use crate::errors::BackendError;

/// Format a human-friendly message with op/path plus platform-aware hints.
fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(" - permission denied; check ownership and write permissions.");
                }
                libc::EXDEV => {
                    msg.push_str(" - cross-filesystem; atomic rename not possible.");
                }
                libc::ENOENT => {
                    msg.push_str(" - path not found; verify it exists.");
                }
                libc::EEXIST => {
                    msg.push_str(" - already exists; remove the target first.");
                }
                libc::ENOTEMPTY => {
                    msg.push_str(" - directory not empty.");
                }
                libc::ENOTDIR => {
                    msg.push_str(" - a path segment is a file, not a directory.");
                }
                libc::ENOSPC => {
                    msg.push_str(" - insufficient space on device.");
                }
                libc::EROFS => {
                    msg.push_str(" - read-only filesystem; cannot write here.");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(" - filename or path too long; shorten path segments.");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 => msg.push_str(" - access denied; check permissions."), // ERROR_ACCESS_DENIED
                17 => msg.push_str(" - not same device; cross-filesystem move."), // ERROR_NOT_SAME_DEVICE
                2 | 3 => msg.push_str(" - path not found; verify it exists."),
                80 => msg.push_str(" - already exists; remove the target first."), // ERROR_FILE_EXISTS
                145 => msg.push_str(" - directory not empty."), // ERROR_DIR_NOT_EMPTY
                112 => msg.push_str(" - insufficient disk space."), // ERROR_DISK_FULL
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str(" - permission denied; check ownership and write permissions.");
            }
            io::ErrorKind::NotFound => {
                msg.push_str(" - path not found; verify it exists.");
            }
            io::ErrorKind::AlreadyExists => {
                msg.push_str(" - already exists; remove the target first.");
            }
            _ => {}
        }
    }

    msg
}

/// Adapter for BackendResult code.
/// Returns a closure suitable for `.map_err(...)` that converts io::Error -> BackendError.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> BackendError + 'a {
    move |e: io::Error| BackendError::Io {
        message: build_message(op, path, &e),
        source: e,
    }
}

/// Adapter for io::Result code.
/// Keeps the original ErrorKind and puts the enriched context in the message.
pub fn io_error_with_help_io<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}
