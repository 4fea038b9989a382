//! Native path entry point.
//!
//! `checkin_paths` takes two host paths and builds the backends itself: the source
//! backend is rooted at the source's parent, the destination backend at the nearest
//! ancestor of the destination that already exists.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::engine::{Checkin, TransferMode, checkin};
use crate::backend::LocalFs;
use crate::errors::{BackendError, CheckinError};
use crate::path;

/// Check a host file or directory in to a host destination path.
///
/// Relative destinations are taken relative to the current working directory.
/// Intermediate directories between the nearest existing ancestor and the
/// destination are created.
pub fn checkin_paths(src: &Path, dst: &Path, mode: TransferMode) -> Result<Checkin<LocalFs>, CheckinError> {
    let src_abs = dunce::canonicalize(src).map_err(|e| source_error(src, e))?;
    let (src_root, src_name) = match (src_abs.parent(), src_abs.file_name().and_then(|n| n.to_str())) {
        (Some(parent), Some(name)) => (parent.to_path_buf(), name.to_string()),
        _ => {
            return Err(CheckinError::InvalidPath {
                path: src_abs.display().to_string(),
                reason: "source has no usable final component",
            });
        }
    };
    let src_fs = LocalFs::new(&src_root)?;

    let dst_abs = absolute(dst)?;
    let anchor = nearest_existing_ancestor(&dst_abs)
        .ok_or_else(|| CheckinError::NoExistingAncestor(dst_abs.clone()))?;
    if !anchor.is_dir() {
        return Err(CheckinError::DestinationUnavailable {
            backend: format!("LocalFs('{}')", anchor.display()),
            path: String::new(),
            source: BackendError::NotADirectory(anchor.display().to_string()),
        });
    }
    let rel = dst_abs
        .strip_prefix(&anchor)
        .ok()
        .and_then(path::from_relative)
        .ok_or_else(|| CheckinError::InvalidPath {
            path: dst_abs.display().to_string(),
            reason: "destination is not expressible below its existing ancestor",
        })?;
    let dst_fs = LocalFs::new(&anchor)?;

    debug!(
        src_root = %src_root.display(),
        src = %src_name,
        anchor = %anchor.display(),
        dest = %rel,
        "resolved host paths"
    );
    checkin(&src_fs, &src_name, dst_fs, &rel, mode)
}

/// Closest strict ancestor of `path` that exists on disk.
pub fn nearest_existing_ancestor(path: &Path) -> Option<PathBuf> {
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir.as_os_str().is_empty() {
            break;
        }
        if dir.exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

fn absolute(dst: &Path) -> Result<PathBuf, CheckinError> {
    let joined = if dst.is_absolute() {
        dst.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| {
            CheckinError::Backend(crate::backend::io_error_with_help("read current directory", Path::new("."))(e))
        })?;
        cwd.join(dst)
    };
    Ok(path::clean_host(&joined))
}

fn source_error(src: &Path, e: io::Error) -> CheckinError {
    if e.kind() == io::ErrorKind::NotFound {
        CheckinError::NotFound {
            backend: "host".to_string(),
            path: src.display().to_string(),
        }
    } else {
        CheckinError::Backend(crate::backend::io_error_with_help("resolve source", src)(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use assert_fs::prelude::*;

    #[test]
    fn nearest_ancestor_skips_missing_segments() {
        let temp = assert_fs::TempDir::new().unwrap();
        let deep = temp.path().join("a/b/c/file.txt");
        assert_eq!(nearest_existing_ancestor(&deep).unwrap(), temp.path());

        temp.child("a/b").create_dir_all().unwrap();
        assert_eq!(nearest_existing_ancestor(&deep).unwrap(), temp.path().join("a/b"));
    }

    #[test]
    fn nearest_ancestor_ignores_the_path_itself() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("d").create_dir_all().unwrap();
        assert_eq!(nearest_existing_ancestor(&temp.path().join("d")).unwrap(), temp.path());
    }

    #[test]
    fn copies_into_missing_intermediates() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/file.txt").write_str("file").unwrap();
        let dst = temp.path().join("tgt/x/y/file.txt");

        let out = checkin_paths(&temp.path().join("src/file.txt"), &dst, TransferMode::Copy).unwrap();
        assert_eq!(out.path, "tgt/x/y/file.txt");
        assert_eq!(out.backend.read_text(&out.path).unwrap(), "file");
        temp.child("src/file.txt").assert("file");
        temp.child("tgt/x/y/file.txt").assert("file");
    }

    #[test]
    fn missing_source_is_not_found() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = checkin_paths(&temp.path().join("nope"), &temp.path().join("tgt/nope"), TransferMode::Copy)
            .unwrap_err();
        assert!(matches!(err, CheckinError::NotFound { .. }));
        assert!(!temp.path().join("tgt").exists());
    }

    #[test]
    fn ancestor_that_is_a_file_is_unavailable() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src.txt").write_str("s").unwrap();
        temp.child("blocker").write_str("b").unwrap();
        let err = checkin_paths(
            &temp.path().join("src.txt"),
            &temp.path().join("blocker/inner/src.txt"),
            TransferMode::Copy,
        )
        .unwrap_err();
        assert!(matches!(err, CheckinError::DestinationUnavailable { .. }));
    }
}
