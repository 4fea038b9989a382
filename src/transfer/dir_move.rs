//! Directory move implementation.
//! Tries a rename first; if that fails (or the target already exists and must be
//! merged into), copies the tree and removes the source.

use tracing::{debug, info};

use super::copy::{copy_dir, require_dir};
use super::util::rename_fallback_hint;
use crate::backend::{Backend, nested_location, same_storage};
use crate::errors::{BackendError, BackendResult};
use crate::path;

/// Move a directory tree between (possibly different) backends.
pub fn move_dir<S, D>(src: &S, src_path: &str, dst: &D, dst_path: &str) -> BackendResult<()>
where
    S: Backend + ?Sized,
    D: Backend + ?Sized,
{
    let sp = path::normalize(src_path)?;
    let dp = path::normalize(dst_path)?;
    require_dir(src, &sp)?;
    if nested_location(src, &sp, dst, &dp) {
        return Err(BackendError::InvalidPath {
            path: dp,
            reason: "cannot move a directory into itself",
        });
    }
    let target_exists = dst.exists(&dp);

    match (src.host_path(&sp), dst.host_path(&dp)) {
        (Some(from), Some(to)) if !target_exists => {
            match super::atomic::try_atomic_move(&from, &to) {
                Ok(()) => {
                    info!(src = %from.display(), dest = %to.display(), "Renamed directory atomically");
                    return Ok(());
                }
                Err(e) => {
                    debug!(error = %e, hint = rename_fallback_hint(&e), "directory rename failed");
                }
            }
        }
        (None, None) if !target_exists && same_storage(src, dst) => {
            dst.rename(&sp, &dp)?;
            debug!(src = %sp, dest = %dp, storage = %dst.describe(), "renamed directory within backend");
            return Ok(());
        }
        _ => {}
    }

    copy_dir(src, &sp, dst, &dp)?;
    src.remove_tree(&sp)?;
    info!(src = %sp, dest = %dp, from = %src.describe(), to = %dst.describe(), "Copied directory contents and removed source");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LocalFs, MemoryFs};
    use assert_fs::prelude::*;

    #[test]
    fn move_dir_success() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("incoming/folder/one.txt").write_str("one").unwrap();
        temp.child("incoming/folder/sub/two.txt").write_str("two").unwrap();
        temp.child("completed").create_dir_all().unwrap();
        let fs = LocalFs::new(temp.path()).unwrap();

        move_dir(&fs, "incoming/folder", &fs, "completed/folder").unwrap();
        assert!(!fs.exists("incoming/folder"));
        assert_eq!(fs.read_text("completed/folder/one.txt").unwrap(), "one");
        assert_eq!(fs.read_text("completed/folder/sub/two.txt").unwrap(), "two");
    }

    #[test]
    fn move_dir_merges_into_existing_target() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/d/new.txt").write_str("new").unwrap();
        temp.child("tgt/d/old.txt").write_str("old").unwrap();
        let fs = LocalFs::new(temp.path()).unwrap();

        move_dir(&fs, "src/d", &fs, "tgt/d").unwrap();
        assert!(!fs.exists("src/d"));
        assert!(fs.is_file("tgt/d/new.txt"));
        assert!(fs.is_file("tgt/d/old.txt"));
    }

    #[test]
    fn move_dir_within_memory_renames() {
        let mem = MemoryFs::new();
        mem.make_dirs("src/d/inner").unwrap();
        mem.write_text("src/d/inner/x", "x").unwrap();

        move_dir(&mem, "src/d", &mem, "d").unwrap();
        assert!(!mem.exists("src/d"));
        assert_eq!(mem.read_text("d/inner/x").unwrap(), "x");
    }

    #[test]
    fn move_dir_into_itself_is_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("d/f.txt").write_str("f").unwrap();
        let fs = LocalFs::new(temp.path()).unwrap();
        let err = move_dir(&fs, "d", &fs, "d/inner").unwrap_err();
        assert!(matches!(err, BackendError::InvalidPath { .. }));
        assert!(fs.is_file("d/f.txt"));
    }
}
