//! Zip codec. Directories are stored as explicit `name/` entries so empty ones
//! survive a round trip.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::ArchiveCodec;
use crate::backend::Backend;
use crate::backend::helpers::io_error_with_help;
use crate::backend::memory::{MemoryFs, Node};
use crate::errors::BackendResult;
use crate::path;

#[derive(Debug, Clone, Copy)]
pub struct Zip;

impl ArchiveCodec for Zip {
    const KIND: &'static str = "ZipFs";

    fn load(file: File, archive: &Path, staged: &MemoryFs) -> BackendResult<()> {
        let mut zip = ZipArchive::new(file)
            .map_err(|e| io_error_with_help("read archive", archive)(io::Error::other(e)))?;
        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .map_err(|e| io_error_with_help("read archive entry", archive)(io::Error::other(e)))?;
            let norm = path::normalize(&entry.name().replace('\\', "/"))?;
            if norm.is_empty() {
                continue;
            }
            if entry.is_dir() {
                staged.make_dirs(&norm)?;
            } else if entry.is_file() {
                let mut data = Vec::new();
                entry
                    .read_to_end(&mut data)
                    .map_err(io_error_with_help("read archive entry", archive))?;
                staged.make_dirs(path::parent(&norm))?;
                staged.write_bytes(&norm, &data)?;
            } else {
                debug!(entry = %norm, "skipping unsupported archive entry");
            }
        }
        Ok(())
    }

    fn store(out: &File, _archive: &Path, staged: &MemoryFs) -> io::Result<usize> {
        let entries = staged.snapshot();
        let mut writer = ZipWriter::new(out);
        let dir_options = SimpleFileOptions::default().unix_permissions(0o755);
        let file_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        for (key, node) in &entries {
            match node {
                Node::Dir => writer
                    .add_directory(format!("{key}/"), dir_options)
                    .map_err(io::Error::other)?,
                Node::File(data) => {
                    writer
                        .start_file(key.as_str(), file_options)
                        .map_err(io::Error::other)?;
                    writer.write_all(data)?;
                }
            }
        }
        writer.finish().map_err(io::Error::other)?;
        Ok(entries.len())
    }
}
