//! Atomic rename helper.
//! - Performs a rename with context-rich errors.
//! - On Windows, removes an existing destination file first (rename doesn't overwrite there).
//! - On Unix, best-effort fsync of the destination directory after rename.

use std::fs;
use std::path::Path;

use crate::backend::io_error_with_help;
use crate::errors::BackendResult;

pub(crate) fn try_atomic_move(src: &Path, dst: &Path) -> BackendResult<()> {
    #[cfg(windows)]
    {
        if dst.is_file() {
            if let Err(e) = fs::remove_file(dst) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    return Err(io_error_with_help("remove existing destination before rename", dst)(e));
                }
            }
        }
    }

    fs::rename(src, dst).map_err(io_error_with_help("atomic rename", src))?;

    #[cfg(unix)]
    {
        // A failed fsync must not turn a completed rename into an error.
        if let Some(parent) = dst.parent() {
            let _ = super::util::fsync_dir(parent);
        }
    }

    Ok(())
}
