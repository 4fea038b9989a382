use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::BackendError;

pub(super) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dst_dir.join(format!(".checkin.{}.{}.tmp", pid, nanos))
}

/// EXDEV / ERROR_NOT_SAME_DEVICE; std has no stable ErrorKind for it.
pub(super) fn is_cross_device(e: &BackendError) -> bool {
    let BackendError::Io { source, .. } = e else {
        return false;
    };
    match source.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EXDEV,
        #[cfg(windows)]
        Some(code) => code == 17,
        _ => false,
    }
}

/// Short reason logged when a rename falls back to copying.
pub(super) fn rename_fallback_hint(e: &BackendError) -> &'static str {
    if is_cross_device(e) {
        return "cross-filesystem; will copy instead";
    }
    match e {
        BackendError::Io { source, .. } if source.kind() == io::ErrorKind::PermissionDenied => {
            "permission denied; check destination perms"
        }
        _ => "falling back to copy",
    }
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(windows)]
pub(super) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
