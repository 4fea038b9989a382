//! Checkin operations: the engine, the native-path adapter and cleanup.

mod cleanup;
mod engine;
pub mod marker;
mod resolve;

pub use cleanup::cleanup;
pub use engine::{Checkin, MarkerOutcome, TransferMode, checkin};
pub use marker::MARKER_SUFFIX;
pub use resolve::{checkin_paths, nearest_existing_ancestor};
