//! Streaming copy into a fresh file.
//!
//! - The destination is created with `create_new`, so an existing file is never clobbered.
//! - Buffered I/O with 1 MiB buffers.
//! - The destination is fsynced before returning; callers rename it into place afterwards.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::backend::io_error_with_help_io;

const BUF_SIZE: usize = 1024 * 1024;

/// Copy `src` -> `dst` and fsync `dst`. Returns the number of bytes written.
pub(super) fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src).map_err(io_error_with_help_io("open source file", src))?;
    let dst_f = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
        .map_err(io_error_with_help_io("create destination file", dst))?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer).map_err(io_error_with_help_io("copy data", dst))?;
    writer.flush()?;
    writer.get_ref().sync_all().map_err(io_error_with_help_io("sync", dst))?;
    Ok(bytes)
}
