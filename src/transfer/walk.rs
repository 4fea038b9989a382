//! Iterative tree listing for backends without a host path.
//!
//! Goes through `is_dir`/`is_file`, so host symlinks are followed and copied as
//! the data they point to.

use crate::backend::Backend;
use crate::errors::{BackendError, BackendResult};
use crate::path;

/// Entries below a directory, as paths relative to it. `dirs` is sorted, so every
/// directory comes after its parent.
#[derive(Debug, Default)]
pub(super) struct Tree {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

pub(super) fn walk<B: Backend + ?Sized>(backend: &B, root: &str) -> BackendResult<Tree> {
    let mut tree = Tree::default();
    let mut pending = vec![String::new()];
    while let Some(rel) = pending.pop() {
        for name in backend.list_dir(&path::join(root, &rel))? {
            let child = path::join(&rel, &name);
            let full = path::join(root, &child);
            if backend.is_dir(&full) {
                tree.dirs.push(child.clone());
                pending.push(child);
            } else if backend.is_file(&full) {
                tree.files.push(child);
            } else {
                // dangling link or special file: nothing to read, refuse rather than drop it
                return Err(BackendError::Unsupported {
                    op: "copying entries that are neither files nor directories",
                    backend: format!("{} ({full})", backend.describe()),
                });
            }
        }
    }
    tree.dirs.sort();
    tree.files.sort();
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryFs;

    #[test]
    fn lists_nested_entries_relative_to_root() {
        let fs = MemoryFs::new();
        fs.make_dirs("root/a/b").unwrap();
        fs.write_text("root/top.txt", "t").unwrap();
        fs.write_text("root/a/b/deep.txt", "d").unwrap();
        fs.write_text("outside.txt", "o").unwrap();

        let tree = walk(&fs, "root").unwrap();
        assert_eq!(tree.dirs, vec!["a", "a/b"]);
        assert_eq!(tree.files, vec!["a/b/deep.txt", "top.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_is_refused() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("root")).unwrap();
        std::os::unix::fs::symlink("missing.txt", temp.path().join("root/dangling")).unwrap();
        let fs = crate::backend::LocalFs::new(temp.path()).unwrap();

        let err = walk(&fs, "root").unwrap_err();
        assert!(matches!(err, BackendError::Unsupported { .. }));
    }
}
