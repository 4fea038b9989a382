//! File move implementation.
//! Attempts an atomic rename when both sides live on the host; on cross-filesystem
//! or other rename errors, falls back to safe copy+rename and removes the source.

use std::fs;

use tracing::{debug, info, warn};

use super::copy::{copy_file, require_file, safe_copy_and_rename};
use super::util::rename_fallback_hint;
use crate::backend::{Backend, io_error_with_help, same_storage};
use crate::errors::{BackendError, BackendResult};
use crate::path;

/// Move a single file between (possibly different) backends. An existing
/// destination file is replaced. The source is removed only after the data is
/// in place at the destination.
pub fn move_file<S, D>(src: &S, src_path: &str, dst: &D, dst_path: &str) -> BackendResult<()>
where
    S: Backend + ?Sized,
    D: Backend + ?Sized,
{
    let sp = path::normalize(src_path)?;
    let dp = path::normalize(dst_path)?;
    require_file(src, &sp)?;
    if dst.is_dir(&dp) {
        return Err(BackendError::NotAFile(dp));
    }

    match (src.host_path(&sp), dst.host_path(&dp)) {
        (Some(from), Some(to)) => {
            if !dst.is_dir(path::parent(&dp)) {
                return Err(BackendError::NotFound(path::parent(&dp).to_string()));
            }
            match super::atomic::try_atomic_move(&from, &to) {
                Ok(()) => {
                    info!(src = %from.display(), dest = %to.display(), "Renamed file atomically");
                }
                Err(e) => {
                    let hint = rename_fallback_hint(&e);
                    warn!(error = %e, hint, "Atomic rename failed, using safe copy+rename");
                    safe_copy_and_rename(&from, &to)?;
                    fs::remove_file(&from).map_err(io_error_with_help("remove original file", &from))?;
                    info!(src = %from.display(), dest = %to.display(), "Copied file and removed source");
                }
            }
        }
        _ if same_storage(src, dst) => {
            debug!(src = %sp, dest = %dp, storage = %dst.describe(), "renaming within backend");
            dst.rename(&sp, &dp)?;
        }
        _ => {
            copy_file(src, &sp, dst, &dp)?;
            src.remove_file(&sp)?;
            info!(src = %sp, dest = %dp, from = %src.describe(), to = %dst.describe(), "Moved file across backends");
        }
    }
    Ok(())
}
