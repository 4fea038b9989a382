//! Cross-backend transfer primitives.
//!
//! Each primitive picks the cheapest correct strategy for the pair of backends:
//! - both on the host: atomic rename / temp-file copy / parallel tree copy;
//! - same in-memory or archive storage: the backend's own `rename`;
//! - anything else: byte copy through `read_bytes`/`write_bytes`.
//!
//! Primitives require the destination's parent to exist already; creating it is
//! the checkin engine's job.

pub(crate) mod atomic;
mod copy;
mod dir_move;
mod file_move;
mod io_copy;
mod util;
mod walk;

pub use copy::{copy_dir, copy_file};
pub use dir_move::move_dir;
pub use file_move::move_file;
