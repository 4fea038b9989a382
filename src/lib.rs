//! Check data in to a storage backend.
//!
//! A checkin copies or moves a file or directory tree from a source backend to a
//! path in a destination backend, creating the destination's parent directories
//! first. Moves leave a `.checkin` marker next to where the source was.
//!
//! - [`checkin`] works on any pair of [`Backend`]s.
//! - [`checkin_paths`] takes two host paths and builds [`LocalFs`] backends,
//!   anchoring the destination at its nearest existing ancestor.
//! - [`cleanup`] removes a checkin result and prunes its top-level directory.
//!
//! ```no_run
//! use checkin_control::{Backend, MemoryFs, TransferMode, checkin};
//!
//! let src = MemoryFs::new();
//! src.make_dirs("src")?;
//! src.write_text("src/file.txt", "hello")?;
//! let dst = MemoryFs::new();
//! let done = checkin(&src, "src/file.txt", &dst, "tgt/file.txt", TransferMode::Move)?;
//! assert_eq!(done.path, "tgt/file.txt");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod checkin;
pub mod cli;
pub mod config;
pub mod errors;
pub mod output;
pub mod path;
pub mod transfer;

pub use backend::{Backend, LocalFs, MemoryFs, TarFs, TempFs, ZipFs};
pub use checkin::{Checkin, MarkerOutcome, TransferMode, checkin, checkin_paths, cleanup};
pub use config::{
    Config, LogLevel, default_config_path, default_log_path, load_config_from_xml_path,
    path_has_symlink_ancestor,
};
pub use errors::{BackendError, BackendResult, CheckinError};
