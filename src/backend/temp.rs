//! Temporary-directory backend: a `LocalFs` over a fresh `tempfile::TempDir`.
//! The directory and everything checked into it disappear when the handle drops.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use super::{Backend, LocalFs};
use super::helpers::io_error_with_help;
use crate::errors::BackendResult;

pub struct TempFs {
    inner: LocalFs,
    dir: TempDir,
}

impl TempFs {
    /// Create a new temp directory whose name starts with `prefix`.
    pub fn new(prefix: &str) -> BackendResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(io_error_with_help("create temp directory", Path::new(prefix)))?;
        let inner = LocalFs::new(dir.path())?;
        debug!(root = %inner.root().display(), "created temp backend");
        Ok(Self { inner, dir })
    }

    pub fn root(&self) -> &Path {
        self.inner.root()
    }

    /// Remove the directory now, reporting failures instead of ignoring them on drop.
    pub fn close(self) -> BackendResult<()> {
        let root = self.inner.root().to_path_buf();
        self.dir
            .close()
            .map_err(io_error_with_help("remove temp directory", &root))
    }
}

impl std::fmt::Debug for TempFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempFs").field("root", &self.inner.root()).finish()
    }
}

impl Backend for TempFs {
    fn describe(&self) -> String {
        format!("TempFs('{}')", self.inner.root().display())
    }
    fn host_path(&self, path: &str) -> Option<PathBuf> {
        self.inner.host_path(path)
    }
    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }
    fn is_file(&self, path: &str) -> bool {
        self.inner.is_file(path)
    }
    fn is_dir(&self, path: &str) -> bool {
        self.inner.is_dir(path)
    }
    fn list_dir(&self, path: &str) -> BackendResult<Vec<String>> {
        self.inner.list_dir(path)
    }
    fn make_dirs(&self, path: &str) -> BackendResult<()> {
        self.inner.make_dirs(path)
    }
    fn read_bytes(&self, path: &str) -> BackendResult<Vec<u8>> {
        self.inner.read_bytes(path)
    }
    fn write_bytes(&self, path: &str, data: &[u8]) -> BackendResult<()> {
        self.inner.write_bytes(path, data)
    }
    fn remove_file(&self, path: &str) -> BackendResult<()> {
        self.inner.remove_file(path)
    }
    fn remove_dir(&self, path: &str) -> BackendResult<()> {
        self.inner.remove_dir(path)
    }
    fn remove_tree(&self, path: &str) -> BackendResult<()> {
        self.inner.remove_tree(path)
    }
    fn rename(&self, from: &str, to: &str) -> BackendResult<()> {
        self.inner.rename(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_removed_on_drop() {
        let fs = TempFs::new("checkin-test").unwrap();
        let root = fs.root().to_path_buf();
        fs.write_text("a.txt", "a").unwrap();
        assert!(root.join("a.txt").is_file());
        drop(fs);
        assert!(!root.exists());
    }

    #[test]
    fn close_reports_success() {
        let fs = TempFs::new("checkin-close").unwrap();
        let root = fs.root().to_path_buf();
        fs.close().unwrap();
        assert!(!root.exists());
    }
}
