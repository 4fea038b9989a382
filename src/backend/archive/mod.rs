//! Archive-backed backends.
//!
//! An `ArchiveFs` stages its tree in a `MemoryFs` and serializes it to an archive
//! file on `commit()` (and, best-effort, on drop when there are unsaved changes).
//! The codec decides the file format:
//! - `TarFs`: tar, gzip-compressed when the name ends in `.tar.gz` or `.tgz`;
//! - `ZipFs`: zip with deflate.
//!
//! Notes:
//! - The archive is written to a temp file next to it and renamed into place, so a
//!   reader never sees a half-written archive.
//! - Identity is the archive path. Two handles opened on one archive describe
//!   themselves identically, so the engine treats them as one storage (same
//!   location checks, in-backend renames) even though neither sees the other's
//!   staged changes. The last commit wins.

mod tar_codec;
mod zip_codec;

use std::fs::File;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::Backend;
use super::helpers::io_error_with_help;
use super::memory::MemoryFs;
use crate::errors::{BackendError, BackendResult};

pub use tar_codec::Tar;
pub use zip_codec::Zip;

/// File format of an `ArchiveFs`.
pub trait ArchiveCodec {
    /// Prefix of `describe()`, e.g. `TarFs`.
    const KIND: &'static str;

    /// Populate `staged` from the archive at `archive`.
    fn load(file: File, archive: &Path, staged: &MemoryFs) -> BackendResult<()>;

    /// Serialize `staged` into `out`; returns the number of entries written.
    fn store(out: &File, archive: &Path, staged: &MemoryFs) -> io::Result<usize>;
}

pub type TarFs = ArchiveFs<Tar>;
pub type ZipFs = ArchiveFs<Zip>;

#[derive(Debug)]
pub struct ArchiveFs<C: ArchiveCodec> {
    archive: PathBuf,
    staged: MemoryFs,
    dirty: AtomicBool,
    codec: PhantomData<C>,
}

impl<C: ArchiveCodec> ArchiveFs<C> {
    /// Start a new, empty archive at `archive`. Nothing touches disk until the
    /// first commit; an existing file there is replaced at that point.
    pub fn create(archive: impl AsRef<Path>) -> BackendResult<Self> {
        Ok(Self {
            archive: absolute(archive.as_ref())?,
            staged: MemoryFs::new(),
            // an empty archive is still written on drop
            dirty: AtomicBool::new(true),
            codec: PhantomData,
        })
    }

    /// Load an existing archive for reading and further writes.
    pub fn open(archive: impl AsRef<Path>) -> BackendResult<Self> {
        let archive = absolute(archive.as_ref())?;
        let file = File::open(&archive).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                BackendError::NotFound(archive.display().to_string())
            } else {
                io_error_with_help("open archive", &archive)(e)
            }
        })?;
        let staged = MemoryFs::new();
        C::load(file, &archive, &staged)?;
        debug!(archive = %archive.display(), kind = C::KIND, "loaded archive backend");
        Ok(Self {
            archive,
            staged,
            dirty: AtomicBool::new(false),
            codec: PhantomData,
        })
    }

    /// Write the staged tree to the archive file.
    pub fn commit(&self) -> BackendResult<()> {
        let dir = self
            .archive
            .parent()
            .ok_or_else(|| BackendError::NotFound(self.archive.display().to_string()))?;
        let tmp = tempfile::Builder::new()
            .prefix(".checkin-archive")
            .tempfile_in(dir)
            .map_err(io_error_with_help("create temporary archive", dir))?;

        let entries = C::store(tmp.as_file(), &self.archive, &self.staged)
            .map_err(io_error_with_help("write archive", tmp.path()))?;
        tmp.as_file()
            .sync_all()
            .map_err(io_error_with_help("sync archive", tmp.path()))?;
        tmp.persist(&self.archive)
            .map_err(|e| io_error_with_help("replace archive", &self.archive)(e.error))?;

        self.dirty.store(false, Ordering::Relaxed);
        info!(archive = %self.archive.display(), kind = C::KIND, entries, "archive written");
        Ok(())
    }

    fn touched<T>(&self, res: BackendResult<T>) -> BackendResult<T> {
        if res.is_ok() {
            self.dirty.store(true, Ordering::Relaxed);
        }
        res
    }
}

impl<C: ArchiveCodec> Drop for ArchiveFs<C> {
    fn drop(&mut self) {
        if self.dirty.load(Ordering::Relaxed) {
            if let Err(e) = self.commit() {
                warn!(archive = %self.archive.display(), error = %e, "failed to write archive on drop");
            }
        }
    }
}

fn absolute(p: &Path) -> BackendResult<PathBuf> {
    std::path::absolute(p).map_err(io_error_with_help("resolve archive path", p))
}

impl<C: ArchiveCodec> Backend for ArchiveFs<C> {
    fn describe(&self) -> String {
        format!("{}('{}')", C::KIND, self.archive.display())
    }
    fn exists(&self, path: &str) -> bool {
        self.staged.exists(path)
    }
    fn is_file(&self, path: &str) -> bool {
        self.staged.is_file(path)
    }
    fn is_dir(&self, path: &str) -> bool {
        self.staged.is_dir(path)
    }
    fn list_dir(&self, path: &str) -> BackendResult<Vec<String>> {
        self.staged.list_dir(path)
    }
    fn make_dirs(&self, path: &str) -> BackendResult<()> {
        self.touched(self.staged.make_dirs(path))
    }
    fn read_bytes(&self, path: &str) -> BackendResult<Vec<u8>> {
        self.staged.read_bytes(path)
    }
    fn write_bytes(&self, path: &str, data: &[u8]) -> BackendResult<()> {
        self.touched(self.staged.write_bytes(path, data))
    }
    fn remove_file(&self, path: &str) -> BackendResult<()> {
        self.touched(self.staged.remove_file(path))
    }
    fn remove_dir(&self, path: &str) -> BackendResult<()> {
        self.touched(self.staged.remove_dir(path))
    }
    fn remove_tree(&self, path: &str) -> BackendResult<()> {
        self.touched(self.staged.remove_tree(path))
    }
    fn rename(&self, from: &str, to: &str) -> BackendResult<()> {
        self.touched(self.staged.rename(from, to))
    }
}
