//! Undo a checkin result.
//!
//! Removes the entry at `path` and then the top-level directory segment it was
//! created under. Only that one segment is pruned: `a/b/c` removes `c` and then
//! tries `a`, which fails if `a/b` is still there.

use tracing::{debug, info, warn};

use super::engine::normalize_operand;
use crate::backend::Backend;
use crate::errors::CheckinError;
use crate::path;

pub fn cleanup<B: Backend + ?Sized>(backend: &B, raw: &str) -> Result<(), CheckinError> {
    let norm = normalize_operand(raw)?;
    if !backend.exists(&norm) {
        return Err(CheckinError::NotFound {
            backend: backend.describe(),
            path: norm,
        });
    }

    if backend.is_file(&norm) {
        backend.remove_file(&norm)?;
    } else {
        backend.remove_tree(&norm)?;
    }
    debug!(path = %norm, backend = %backend.describe(), "removed checkin result");

    let segments = path::parts(&norm);
    if segments.len() > 1 {
        let top = segments[0].to_string();
        if let Err(source) = backend.remove_dir(&top) {
            warn!(path = %norm, top = %top, error = %source, "top-level directory left behind");
            return Err(CheckinError::CleanupInconsistency { path: norm, top, source });
        }
    }
    info!(path = %norm, backend = %backend.describe(), "Cleanup completed");
    Ok(())
}
