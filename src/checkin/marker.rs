//! Move markers.
//!
//! After a successful move, a small JSON document is written next to where the
//! source used to be, at `<source path>.checkin`:
//!
//! ```text
//! {"LocalFs('/data/archive')": "tgt/file.txt"}
//! ```
//!
//! The single key is the destination backend's `describe()` string, the value the
//! destination path. There is no schema version; nothing in this crate reads the
//! marker back during a checkin.

use std::collections::BTreeMap;

use crate::backend::Backend;
use crate::errors::{BackendError, BackendResult};

pub const MARKER_SUFFIX: &str = ".checkin";

/// Marker location for a (normalized) source path.
pub fn marker_path(src_path: &str) -> String {
    format!("{src_path}{MARKER_SUFFIX}")
}

/// Serialize the marker body.
pub fn render(dest_backend: &str, dest_path: &str) -> String {
    let mut map = BTreeMap::new();
    map.insert(dest_backend, dest_path);
    // A map of strings always serializes.
    serde_json::to_string(&map).unwrap_or_default()
}

/// Write the marker for a move of `src_path` into (`dest_backend`, `dest_path`).
/// Returns the marker path.
pub fn write_marker<S: Backend + ?Sized>(
    src: &S,
    src_path: &str,
    dest_backend: &str,
    dest_path: &str,
) -> BackendResult<String> {
    let at = marker_path(src_path);
    src.write_text(&at, &render(dest_backend, dest_path))?;
    Ok(at)
}

/// Read a marker back as (destination backend, destination path).
pub fn read_marker<S: Backend + ?Sized>(src: &S, src_path: &str) -> BackendResult<(String, String)> {
    let at = marker_path(src_path);
    let text = src.read_text(&at)?;
    let map: BTreeMap<String, String> =
        serde_json::from_str(&text).map_err(|_| BackendError::InvalidPath {
            path: at.clone(),
            reason: "marker is not a JSON object of strings",
        })?;
    let mut entries = map.into_iter();
    match (entries.next(), entries.next()) {
        (Some(entry), None) => Ok(entry),
        _ => Err(BackendError::InvalidPath {
            path: at,
            reason: "marker must hold exactly one entry",
        }),
    }
}
