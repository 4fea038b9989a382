//! Storage backends.
//!
//! The checkin engine only talks to storage through the `Backend` trait. Paths
//! passed to every method are backend-relative (see `crate::path`); each
//! implementation normalizes them itself, so callers may pass raw strings.
//!
//! Shipped implementations:
//! - `LocalFs`: a host directory.
//! - `TempFs`: a host temp directory removed on drop.
//! - `MemoryFs`: an in-process tree, handy for tests.
//! - `TarFs`, `ZipFs`: an archive file, staged in memory and written on commit/drop.

pub mod helpers;
mod local;
mod memory;
mod archive;
mod temp;

use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::{BackendError, BackendResult};

pub use helpers::{io_error_with_help, io_error_with_help_io};
pub use local::LocalFs;
pub use memory::MemoryFs;
pub use archive::{ArchiveCodec, ArchiveFs, Tar, TarFs, Zip, ZipFs};
pub use temp::TempFs;

/// Minimal storage contract consumed by `checkin` and `cleanup`.
///
/// Methods take `&self`: a single handle can be both the source and the
/// destination of a checkin. Backends holding state in memory synchronize
/// internally.
pub trait Backend {
    /// Stable, human-readable identity of this storage, e.g. `LocalFs('/data')`.
    /// Used as the key of move markers and to detect same-storage transfers.
    fn describe(&self) -> String;

    /// Host filesystem location of `path`, for backends that live on the host.
    fn host_path(&self, _path: &str) -> Option<PathBuf> {
        None
    }

    fn exists(&self, path: &str) -> bool;
    fn is_file(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;

    /// Names of the direct children of a directory, sorted.
    fn list_dir(&self, path: &str) -> BackendResult<Vec<String>>;

    /// Create `path` and every missing ancestor. Succeeds if it already is a directory.
    fn make_dirs(&self, path: &str) -> BackendResult<()>;

    fn read_bytes(&self, path: &str) -> BackendResult<Vec<u8>>;

    /// Create or replace a file. The parent directory must exist.
    fn write_bytes(&self, path: &str, data: &[u8]) -> BackendResult<()>;

    fn remove_file(&self, path: &str) -> BackendResult<()>;

    /// Remove a single empty directory.
    fn remove_dir(&self, path: &str) -> BackendResult<()>;

    /// Remove a directory and everything below it.
    fn remove_tree(&self, path: &str) -> BackendResult<()>;

    /// Move an entry within this backend. Destination parent must exist;
    /// an existing destination file is replaced.
    fn rename(&self, from: &str, to: &str) -> BackendResult<()>;

    fn read_text(&self, path: &str) -> BackendResult<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|_| BackendError::InvalidUtf8(path.to_string()))
    }

    fn write_text(&self, path: &str, text: &str) -> BackendResult<()> {
        self.write_bytes(path, text.as_bytes())
    }
}

macro_rules! forward_backend {
    ($($ty:ty),+) => {$(
        impl<T: Backend + ?Sized> Backend for $ty {
            fn describe(&self) -> String {
                (**self).describe()
            }
            fn host_path(&self, path: &str) -> Option<PathBuf> {
                (**self).host_path(path)
            }
            fn exists(&self, path: &str) -> bool {
                (**self).exists(path)
            }
            fn is_file(&self, path: &str) -> bool {
                (**self).is_file(path)
            }
            fn is_dir(&self, path: &str) -> bool {
                (**self).is_dir(path)
            }
            fn list_dir(&self, path: &str) -> BackendResult<Vec<String>> {
                (**self).list_dir(path)
            }
            fn make_dirs(&self, path: &str) -> BackendResult<()> {
                (**self).make_dirs(path)
            }
            fn read_bytes(&self, path: &str) -> BackendResult<Vec<u8>> {
                (**self).read_bytes(path)
            }
            fn write_bytes(&self, path: &str, data: &[u8]) -> BackendResult<()> {
                (**self).write_bytes(path, data)
            }
            fn remove_file(&self, path: &str) -> BackendResult<()> {
                (**self).remove_file(path)
            }
            fn remove_dir(&self, path: &str) -> BackendResult<()> {
                (**self).remove_dir(path)
            }
            fn remove_tree(&self, path: &str) -> BackendResult<()> {
                (**self).remove_tree(path)
            }
            fn rename(&self, from: &str, to: &str) -> BackendResult<()> {
                (**self).rename(from, to)
            }
            fn read_text(&self, path: &str) -> BackendResult<String> {
                (**self).read_text(path)
            }
            fn write_text(&self, path: &str, text: &str) -> BackendResult<()> {
                (**self).write_text(path, text)
            }
        }
    )+};
}

forward_backend!(&T, Box<T>, Arc<T>);

/// True when two non-host handles address the same storage, so an entry can move
/// between them with the backend's own `rename`. Host pairs never take this path:
/// the transfer primitives rename host paths directly.
pub(crate) fn same_storage<S, D>(src: &S, dst: &D) -> bool
where
    S: Backend + ?Sized,
    D: Backend + ?Sized,
{
    match (src.host_path(""), dst.host_path("")) {
        (None, None) => src.describe() == dst.describe(),
        _ => false,
    }
}

/// True when `src_path` in `src` and `dst_path` in `dst` are the same entry.
pub(crate) fn same_location<S, D>(src: &S, src_path: &str, dst: &D, dst_path: &str) -> bool
where
    S: Backend + ?Sized,
    D: Backend + ?Sized,
{
    match (src.host_path(src_path), dst.host_path(dst_path)) {
        (Some(a), Some(b)) => a == b,
        (None, None) => src.describe() == dst.describe() && src_path == dst_path,
        _ => false,
    }
}

/// True when `dst_path` lies below directory `src_path` on the same storage.
pub(crate) fn nested_location<S, D>(src: &S, src_path: &str, dst: &D, dst_path: &str) -> bool
where
    S: Backend + ?Sized,
    D: Backend + ?Sized,
{
    match (src.host_path(src_path), dst.host_path(dst_path)) {
        (Some(a), Some(b)) => b != a && b.starts_with(&a),
        (None, None) => {
            src.describe() == dst.describe() && crate::path::is_descendant(src_path, dst_path)
        }
        _ => false,
    }
}
