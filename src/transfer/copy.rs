//! Copy primitives.
//!
//! Host-to-host file copies go through a temp file in the destination directory and
//! an atomic rename, so the destination name only ever shows a complete file.
//! Host-to-host directory copies walk the tree and copy files in parallel.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::atomic::try_atomic_move;
use super::{io_copy, util, walk};
use crate::backend::{Backend, io_error_with_help};
use crate::errors::{BackendError, BackendResult};
use crate::path;

/// Copy a single file between (possibly different) backends. An existing
/// destination file is replaced.
pub fn copy_file<S, D>(src: &S, src_path: &str, dst: &D, dst_path: &str) -> BackendResult<()>
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
        (Some(from), Some(to)) => safe_copy_and_rename(&from, &to)?,
        _ => {
            let data = src.read_bytes(&sp)?;
            dst.write_bytes(&dp, &data)?;
        }
    }
    debug!(src = %sp, dest = %dp, from = %src.describe(), to = %dst.describe(), "copied file");
    Ok(())
}

/// Copy a directory tree between (possibly different) backends. Copying onto an
/// existing directory merges into it. If the copy fails and the destination did
/// not exist beforehand, the partial tree is removed.
pub fn copy_dir<S, D>(src: &S, src_path: &str, dst: &D, dst_path: &str) -> BackendResult<()>
where
    S: Backend + ?Sized,
    D: Backend + ?Sized,
{
    let sp = path::normalize(src_path)?;
    let dp = path::normalize(dst_path)?;
    require_dir(src, &sp)?;
    if crate::backend::nested_location(src, &sp, dst, &dp) {
        return Err(BackendError::InvalidPath {
            path: dp,
            reason: "cannot copy a directory into itself",
        });
    }
    let existed = dst.exists(&dp);
    if existed && !dst.is_dir(&dp) {
        return Err(BackendError::NotADirectory(dp));
    }
    if !dst.is_dir(path::parent(&dp)) {
        return Err(BackendError::NotFound(path::parent(&dp).to_string()));
    }

    let result = match (src.host_path(&sp), dst.host_path(&dp)) {
        (Some(from), Some(to)) => copy_tree_host(&from, &to),
        _ => copy_tree_generic(src, &sp, dst, &dp),
    };

    if let Err(e) = result {
        if !existed {
            if let Err(cleanup) = dst.remove_tree(&dp) {
                if !cleanup.is_not_found() {
                    warn!(dest = %dp, error = %cleanup, "failed to remove partial copy");
                }
            }
        }
        return Err(e);
    }
    info!(src = %sp, dest = %dp, from = %src.describe(), to = %dst.describe(), "copied directory");
    Ok(())
}

/// Core: copy src -> temp in dest dir, then atomic rename temp -> dest.
pub(super) fn safe_copy_and_rename(src: &Path, dest: &Path) -> BackendResult<()> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| BackendError::NotFound(dest.display().to_string()))?;
    if !dest_dir.is_dir() {
        return Err(BackendError::NotFound(dest_dir.display().to_string()));
    }

    let tmp_path = util::unique_temp_path(dest_dir);
    if let Err(e) = io_copy::copy_streaming(src, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        // copy_streaming already names the operation and path.
        let message = e.to_string();
        return Err(BackendError::Io { message, source: e });
    }

    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

/// Recreate the directory layout under `target`, copy files in parallel, then
/// recreate symlinks as links (their targets are not followed). The whole source
/// tree is scanned before anything is written: an entry that cannot be carried
/// over fails the copy with the destination untouched.
pub(super) fn copy_tree_host(src_dir: &Path, target: &Path) -> BackendResult<()> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    let mut links = Vec::new();
    for entry in WalkDir::new(src_dir).min_depth(1) {
        let entry = entry.map_err(|e| io_error_with_help("walk source tree", src_dir)(e.into()))?;
        let rel = entry
            .path()
            .strip_prefix(src_dir)
            .map_err(|_| BackendError::InvalidPath {
                path: entry.path().display().to_string(),
                reason: "outside of the source tree",
            })?
            .to_path_buf();
        let ftype = entry.file_type();
        if ftype.is_dir() {
            dirs.push(rel);
        } else if ftype.is_file() {
            files.push(rel);
        } else if ftype.is_symlink() {
            let link_target = fs::read_link(entry.path())
                .map_err(io_error_with_help("read symlink", entry.path()))?;
            links.push((rel, link_target));
        } else {
            return Err(BackendError::Unsupported {
                op: "copying special files",
                backend: format!("host ({})", entry.path().display()),
            });
        }
    }
    #[cfg(not(unix))]
    {
        if let Some((rel, _)) = links.first() {
            return Err(BackendError::Unsupported {
                op: "copying symlinks",
                backend: format!("host ({})", src_dir.join(rel).display()),
            });
        }
    }

    fs::create_dir_all(target).map_err(io_error_with_help("create directory", target))?;
    for rel in &dirs {
        let new_dir = target.join(rel);
        fs::create_dir_all(&new_dir).map_err(io_error_with_help("create directory", &new_dir))?;
    }

    files.par_iter().try_for_each(|rel| -> BackendResult<()> {
        let from = src_dir.join(rel);
        let to = target.join(rel);
        fs::copy(&from, &to).map_err(io_error_with_help("copy file to destination", &to))?;
        Ok(())
    })?;

    for (rel, link_target) in &links {
        recreate_symlink(link_target, &target.join(rel))?;
    }
    if !links.is_empty() {
        debug!(count = links.len(), dest = %target.display(), "recreated symlinks");
    }
    Ok(())
}

/// Point `at` to `link_target`, replacing a file or link already there.
#[cfg(unix)]
fn recreate_symlink(link_target: &Path, at: &Path) -> BackendResult<()> {
    if let Ok(meta) = fs::symlink_metadata(at) {
        if meta.is_dir() {
            return Err(BackendError::NotAFile(at.display().to_string()));
        }
        fs::remove_file(at).map_err(io_error_with_help("replace existing entry", at))?;
    }
    std::os::unix::fs::symlink(link_target, at).map_err(io_error_with_help("create symlink", at))
}

#[cfg(not(unix))]
fn recreate_symlink(_link_target: &Path, at: &Path) -> BackendResult<()> {
    Err(BackendError::Unsupported {
        op: "creating symlinks",
        backend: format!("host ({})", at.display()),
    })
}

fn copy_tree_generic<S, D>(src: &S, sp: &str, dst: &D, dp: &str) -> BackendResult<()>
where
    S: Backend + ?Sized,
    D: Backend + ?Sized,
{
    let tree = walk::walk(src, sp)?;
    dst.make_dirs(dp)?;
    for dir in &tree.dirs {
        dst.make_dirs(&path::join(dp, dir))?;
    }
    for file in &tree.files {
        let data = src.read_bytes(&path::join(sp, file))?;
        dst.write_bytes(&path::join(dp, file), &data)?;
    }
    Ok(())
}

pub(super) fn require_file<B: Backend + ?Sized>(backend: &B, norm: &str) -> BackendResult<()> {
    if backend.is_file(norm) {
        Ok(())
    } else if backend.exists(norm) {
        Err(BackendError::NotAFile(norm.to_string()))
    } else {
        Err(BackendError::NotFound(norm.to_string()))
    }
}

pub(super) fn require_dir<B: Backend + ?Sized>(backend: &B, norm: &str) -> BackendResult<()> {
    if backend.is_dir(norm) {
        Ok(())
    } else if backend.exists(norm) {
        Err(BackendError::NotADirectory(norm.to_string()))
    } else {
        Err(BackendError::NotFound(norm.to_string()))
    }
}
