//! Checkin engine.
//!
//! `checkin` puts the data at (`src`, `src_path`) at (`dst`, `dst_path`):
//! 1. validates both paths and that the source exists (nothing on the destination
//!    side is touched before this);
//! 2. creates the destination's parent directories if missing;
//! 3. copies or moves the file or directory tree;
//! 4. for moves, writes a marker at `<src_path>.checkin` recording where the data went.
//!
//! No rollback: if the transfer fails after the parent was created, the parent stays.
//! Callers wanting undo semantics pair a checkin with `cleanup`.

use std::fmt;

use tracing::{debug, info, warn};

use super::marker;
use crate::backend::{Backend, nested_location, same_location};
use crate::errors::{BackendError, CheckinError};
use crate::path;
use crate::transfer;

/// Copy leaves the source in place; move removes it once the data has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

impl TransferMode {
    pub fn from_move_flag(move_: bool) -> Self {
        if move_ { TransferMode::Move } else { TransferMode::Copy }
    }

    pub fn is_move(self) -> bool {
        self == TransferMode::Move
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        })
    }
}

/// What happened to the move marker.
#[derive(Debug)]
pub enum MarkerOutcome {
    /// Copies do not write a marker.
    NotRequested,
    /// Marker written at this source-backend path.
    Written(String),
    /// The data moved, but the marker could not be written (`MarkerWriteFailed`).
    Failed(CheckinError),
}

/// Where the data lives after a successful checkin.
#[derive(Debug)]
pub struct Checkin<B> {
    pub backend: B,
    pub path: String,
    pub marker: MarkerOutcome,
}

/// Check the data at (`src`, `src_path`) in to (`dst`, `dst_path`).
///
/// `dst` is taken by value and handed back in the result; pass `&backend` (or an
/// `Arc`) to keep using the handle afterwards.
pub fn checkin<S, D>(
    src: &S,
    src_path: &str,
    dst: D,
    dst_path: &str,
    mode: TransferMode,
) -> Result<Checkin<D>, CheckinError>
where
    S: Backend + ?Sized,
    D: Backend,
{
    let sp = normalize_operand(src_path)?;
    let dp = normalize_operand(dst_path)?;

    if !src.exists(&sp) {
        return Err(CheckinError::NotFound {
            backend: src.describe(),
            path: sp,
        });
    }
    if same_location(src, &sp, &dst, &dp) {
        return Err(CheckinError::SameLocation {
            backend: dst.describe(),
            path: dp,
        });
    }
    let is_file = src.is_file(&sp);
    if !is_file && nested_location(src, &sp, &dst, &dp) {
        return Err(CheckinError::NestedDestination { src: sp, dest: dp });
    }

    ensure_parent(&dst, &dp)?;

    debug!(src = %sp, dest = %dp, %mode, is_file, from = %src.describe(), to = %dst.describe(), "dispatch checkin");
    let transferred = match (is_file, mode) {
        (true, TransferMode::Copy) => transfer::copy_file(src, &sp, &dst, &dp),
        (true, TransferMode::Move) => transfer::move_file(src, &sp, &dst, &dp),
        (false, TransferMode::Copy) => transfer::copy_dir(src, &sp, &dst, &dp),
        (false, TransferMode::Move) => transfer::move_dir(src, &sp, &dst, &dp),
    };
    transferred.map_err(|source| CheckinError::TransferFailed {
        src: sp.clone(),
        dest: dp.clone(),
        source,
    })?;

    let marker = if mode.is_move() {
        match marker::write_marker(src, &sp, &dst.describe(), &dp) {
            Ok(at) => MarkerOutcome::Written(at),
            Err(source) => {
                let err = CheckinError::MarkerWriteFailed {
                    path: marker::marker_path(&sp),
                    source,
                };
                warn!(error = %err, cause = ?std::error::Error::source(&err), "data moved but checkin marker was not written");
                MarkerOutcome::Failed(err)
            }
        }
    } else {
        MarkerOutcome::NotRequested
    };

    info!(src = %sp, dest = %dp, %mode, to = %dst.describe(), "Checkin completed");
    Ok(Checkin {
        backend: dst,
        path: dp,
        marker,
    })
}

pub(super) fn normalize_operand(raw: &str) -> Result<String, CheckinError> {
    let norm = path::normalize(raw).map_err(|e| match e {
        BackendError::InvalidPath { path, reason } => CheckinError::InvalidPath { path, reason },
        other => CheckinError::Backend(other),
    })?;
    if norm.is_empty() {
        return Err(CheckinError::InvalidPath {
            path: raw.to_string(),
            reason: "refers to the backend root",
        });
    }
    Ok(norm)
}

/// Create the parent of `dp` if needed. Idempotent.
fn ensure_parent<D: Backend + ?Sized>(dst: &D, dp: &str) -> Result<(), CheckinError> {
    let parent = path::parent(dp);
    if parent.is_empty() || dst.is_dir(parent) {
        return Ok(());
    }
    let unavailable = |source| CheckinError::DestinationUnavailable {
        backend: dst.describe(),
        path: parent.to_string(),
        source,
    };
    if dst.exists(parent) {
        return Err(unavailable(BackendError::NotADirectory(parent.to_string())));
    }
    dst.make_dirs(parent).map_err(unavailable)?;
    debug!(parent, backend = %dst.describe(), "created destination parent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryFs;

    fn seeded() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.make_dirs("src/directory/nested").unwrap();
        fs.write_text("src/file.txt", "file").unwrap();
        fs.write_text("src/directory/nested/deep.txt", "deep").unwrap();
        fs
    }

    #[test]
    fn copy_creates_parent_and_keeps_source() {
        let fs = seeded();
        let out = checkin(&fs, "src/file.txt", &fs, "tgt/a/b/file.txt", TransferMode::Copy).unwrap();
        assert_eq!(out.path, "tgt/a/b/file.txt");
        assert!(matches!(out.marker, MarkerOutcome::NotRequested));
        assert_eq!(fs.read_text("tgt/a/b/file.txt").unwrap(), "file");
        assert!(fs.is_file("src/file.txt"));
    }

    #[test]
    fn move_writes_marker() {
        let src = seeded();
        let dst = MemoryFs::new();
        let out = checkin(&src, "src/directory", &dst, "tgt/directory", TransferMode::Move).unwrap();
        assert!(!src.exists("src/directory"));
        assert_eq!(dst.read_text("tgt/directory/nested/deep.txt").unwrap(), "deep");
        match out.marker {
            MarkerOutcome::Written(at) => assert_eq!(at, "src/directory.checkin"),
            other => panic!("unexpected marker outcome: {other:?}"),
        }
        let (backend, path) = marker::read_marker(&src, "src/directory").unwrap();
        assert_eq!(backend, dst.describe());
        assert_eq!(path, "tgt/directory");
    }

    #[test]
    fn missing_source_touches_nothing() {
        let src = seeded();
        let dst = MemoryFs::new();
        let err = checkin(&src, "src/nope.txt", &dst, "tgt/x/nope.txt", TransferMode::Copy).unwrap_err();
        assert!(matches!(err, CheckinError::NotFound { .. }));
        assert!(!dst.exists("tgt"));
    }

    #[test]
    fn same_location_is_rejected() {
        let fs = seeded();
        let err = checkin(&fs, "src/file.txt", &fs, "./src//file.txt", TransferMode::Move).unwrap_err();
        assert!(matches!(err, CheckinError::SameLocation { .. }));
        assert!(fs.is_file("src/file.txt"));
    }

    #[test]
    fn nested_destination_is_rejected() {
        let fs = seeded();
        let err = checkin(&fs, "src", &fs, "src/directory/copy", TransferMode::Copy).unwrap_err();
        assert!(matches!(err, CheckinError::NestedDestination { .. }));
    }

    #[test]
    fn parent_collision_with_file_is_unavailable() {
        let fs = seeded();
        let err = checkin(&fs, "src/directory", &fs, "src/file.txt/inner", TransferMode::Copy).unwrap_err();
        assert!(matches!(err, CheckinError::DestinationUnavailable { .. }));
    }

    #[test]
    fn root_operands_are_invalid() {
        let fs = seeded();
        assert!(matches!(
            checkin(&fs, "/", &fs, "x", TransferMode::Copy),
            Err(CheckinError::InvalidPath { .. })
        ));
        assert!(matches!(
            checkin(&fs, "src/file.txt", &fs, "../x", TransferMode::Copy),
            Err(CheckinError::InvalidPath { .. })
        ));
    }

    #[test]
    fn marker_failure_does_not_fail_the_move() {
        // Source root holds the file; a directory squats on the marker name.
        let src = MemoryFs::new();
        src.write_text("f.txt", "f").unwrap();
        src.make_dirs("f.txt.checkin").unwrap();
        let dst = MemoryFs::new();

        let out = checkin(&src, "f.txt", &dst, "f.txt", TransferMode::Move).unwrap();
        assert!(dst.is_file("f.txt"));
        assert!(!src.exists("f.txt"));
        match out.marker {
            MarkerOutcome::Failed(CheckinError::MarkerWriteFailed { path, .. }) => {
                assert_eq!(path, "f.txt.checkin")
            }
            other => panic!("expected marker failure, got {other:?}"),
        }
    }

    #[test]
    fn transfer_failure_is_wrapped() {
        let src = seeded();
        let dst = MemoryFs::new();
        dst.make_dirs("tgt/file.txt").unwrap();
        let err = checkin(&src, "src/file.txt", &dst, "tgt/file.txt", TransferMode::Copy).unwrap_err();
        match err {
            CheckinError::TransferFailed { source, .. } => {
                assert!(matches!(source, BackendError::NotAFile(_)))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
