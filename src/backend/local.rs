//! Host directory backend.
//! All paths resolve below a canonical root; nothing outside the root is reachable
//! through backend paths (`..` above the root is rejected during normalization).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Backend;
use super::helpers::io_error_with_help;
use crate::errors::{BackendError, BackendResult};
use crate::path;

/// A backend rooted at an existing host directory.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Open `root`, which must exist and be a directory. The root is
    /// symlink-resolved so host paths of two handles compare reliably.
    pub fn new(root: impl AsRef<Path>) -> BackendResult<Self> {
        let root = root.as_ref();
        let canonical = dunce::canonicalize(root).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BackendError::NotFound(root.display().to_string())
            } else {
                io_error_with_help("resolve backend root", root)(e)
            }
        })?;
        if !canonical.is_dir() {
            return Err(BackendError::NotADirectory(canonical.display().to_string()));
        }
        Ok(Self { root: canonical })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host(&self, raw: &str) -> BackendResult<(String, PathBuf)> {
        let norm = path::normalize(raw)?;
        let host = path::to_host(&self.root, &norm);
        Ok((norm, host))
    }

    fn require_parent_dir(&self, norm: &str) -> BackendResult<()> {
        let parent = path::parent(norm);
        if !self.is_dir(parent) {
            if self.exists(parent) {
                return Err(BackendError::NotADirectory(parent.to_string()));
            }
            return Err(BackendError::NotFound(parent.to_string()));
        }
        Ok(())
    }
}

impl Backend for LocalFs {
    fn describe(&self) -> String {
        format!("LocalFs('{}')", self.root.display())
    }

    fn host_path(&self, raw: &str) -> Option<PathBuf> {
        self.host(raw).ok().map(|(_, host)| host)
    }

    fn exists(&self, raw: &str) -> bool {
        match self.host(raw) {
            Ok((_, host)) => fs::symlink_metadata(host).is_ok(),
            Err(_) => false,
        }
    }

    fn is_file(&self, raw: &str) -> bool {
        match self.host(raw) {
            Ok((_, host)) => host.is_file(),
            Err(_) => false,
        }
    }

    fn is_dir(&self, raw: &str) -> bool {
        match self.host(raw) {
            Ok((_, host)) => host.is_dir(),
            Err(_) => false,
        }
    }

    fn list_dir(&self, raw: &str) -> BackendResult<Vec<String>> {
        let (norm, host) = self.host(raw)?;
        if !host.is_dir() {
            return Err(if host.exists() {
                BackendError::NotADirectory(norm)
            } else {
                BackendError::NotFound(norm)
            });
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&host).map_err(io_error_with_help("list directory", &host))? {
            let entry = entry.map_err(io_error_with_help("list directory", &host))?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => debug!(dir = %host.display(), ?name, "skipping non UTF-8 entry"),
            }
        }
        names.sort();
        Ok(names)
    }

    fn make_dirs(&self, raw: &str) -> BackendResult<()> {
        let (norm, host) = self.host(raw)?;
        if host.is_dir() {
            return Ok(());
        }
        if host.exists() {
            return Err(BackendError::NotADirectory(norm));
        }
        fs::create_dir_all(&host).map_err(io_error_with_help("create directory", &host))
    }

    fn read_bytes(&self, raw: &str) -> BackendResult<Vec<u8>> {
        let (norm, host) = self.host(raw)?;
        if host.is_dir() {
            return Err(BackendError::NotAFile(norm));
        }
        fs::read(&host).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BackendError::NotFound(norm.clone())
            } else {
                io_error_with_help("read file", &host)(e)
            }
        })
    }

    fn write_bytes(&self, raw: &str, data: &[u8]) -> BackendResult<()> {
        let (norm, host) = self.host(raw)?;
        if norm.is_empty() || host.is_dir() {
            return Err(BackendError::NotAFile(norm));
        }
        self.require_parent_dir(&norm)?;
        fs::write(&host, data).map_err(io_error_with_help("write file", &host))
    }

    fn remove_file(&self, raw: &str) -> BackendResult<()> {
        let (norm, host) = self.host(raw)?;
        if !self.exists(&norm) {
            return Err(BackendError::NotFound(norm));
        }
        if host.is_dir() {
            return Err(BackendError::NotAFile(norm));
        }
        fs::remove_file(&host).map_err(io_error_with_help("remove file", &host))
    }

    fn remove_dir(&self, raw: &str) -> BackendResult<()> {
        let (norm, host) = self.host(raw)?;
        if norm.is_empty() {
            return Err(BackendError::InvalidPath {
                path: raw.to_string(),
                reason: "cannot remove the backend root",
            });
        }
        if !host.is_dir() {
            return Err(if self.exists(&norm) {
                BackendError::NotADirectory(norm)
            } else {
                BackendError::NotFound(norm)
            });
        }
        let mut entries = fs::read_dir(&host).map_err(io_error_with_help("inspect directory", &host))?;
        if entries.next().is_some() {
            return Err(BackendError::DirectoryNotEmpty(norm));
        }
        fs::remove_dir(&host).map_err(io_error_with_help("remove directory", &host))
    }

    fn remove_tree(&self, raw: &str) -> BackendResult<()> {
        let (norm, host) = self.host(raw)?;
        if norm.is_empty() {
            return Err(BackendError::InvalidPath {
                path: raw.to_string(),
                reason: "cannot remove the backend root",
            });
        }
        if !host.is_dir() {
            return Err(if self.exists(&norm) {
                BackendError::NotADirectory(norm)
            } else {
                BackendError::NotFound(norm)
            });
        }
        fs::remove_dir_all(&host).map_err(io_error_with_help("remove directory tree", &host))
    }

    fn rename(&self, from: &str, to: &str) -> BackendResult<()> {
        let (from_norm, from_host) = self.host(from)?;
        let (to_norm, to_host) = self.host(to)?;
        if !self.exists(&from_norm) {
            return Err(BackendError::NotFound(from_norm));
        }
        self.require_parent_dir(&to_norm)?;
        crate::transfer::atomic::try_atomic_move(&from_host, &to_host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn new_requires_existing_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.child("missing");
        assert!(matches!(LocalFs::new(missing.path()), Err(BackendError::NotFound(_))));

        let file = temp.child("f.txt");
        file.write_str("x").unwrap();
        assert!(matches!(LocalFs::new(file.path()), Err(BackendError::NotADirectory(_))));
    }

    #[test]
    fn make_dirs_is_idempotent() {
        let temp = assert_fs::TempDir::new().unwrap();
        let fs = LocalFs::new(temp.path()).unwrap();
        fs.make_dirs("a/b/c").unwrap();
        fs.make_dirs("a/b/c").unwrap();
        assert!(fs.is_dir("a/b/c"));
        assert!(temp.child("a/b/c").path().is_dir());
    }

    #[test]
    fn remove_dir_refuses_non_empty() {
        let temp = assert_fs::TempDir::new().unwrap();
        let fs = LocalFs::new(temp.path()).unwrap();
        fs.make_dirs("top/inner").unwrap();
        let err = fs.remove_dir("top").unwrap_err();
        assert!(matches!(err, BackendError::DirectoryNotEmpty(_)));
        fs.remove_dir("top/inner").unwrap();
        fs.remove_dir("top").unwrap();
        assert!(!fs.exists("top"));
    }

    #[test]
    fn paths_cannot_escape_root() {
        let temp = assert_fs::TempDir::new().unwrap();
        let fs = LocalFs::new(temp.path()).unwrap();
        assert!(!fs.exists(".."));
        assert!(matches!(
            fs.write_text("../escape.txt", "x"),
            Err(BackendError::InvalidPath { .. })
        ));
    }

    #[test]
    fn text_round_trip() {
        let temp = assert_fs::TempDir::new().unwrap();
        let fs = LocalFs::new(temp.path()).unwrap();
        fs.write_text("note.txt", "hello").unwrap();
        assert_eq!(fs.read_text("note.txt").unwrap(), "hello");
        assert!(fs.is_file("/note.txt"));
        assert_eq!(fs.list_dir("").unwrap(), vec!["note.txt".to_string()]);
    }
}
