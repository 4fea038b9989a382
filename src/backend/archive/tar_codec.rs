//! Tar codec, gzip-wrapped for `.tar.gz` / `.tgz` names.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::debug;

use super::ArchiveCodec;
use crate::backend::Backend;
use crate::backend::helpers::io_error_with_help;
use crate::backend::memory::{MemoryFs, Node};
use crate::errors::BackendResult;
use crate::path;

#[derive(Debug, Clone, Copy)]
pub struct Tar;

fn gzipped(archive: &Path) -> bool {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}

impl ArchiveCodec for Tar {
    const KIND: &'static str = "TarFs";

    fn load(file: File, archive: &Path, staged: &MemoryFs) -> BackendResult<()> {
        if gzipped(archive) {
            load_entries(GzDecoder::new(file), archive, staged)
        } else {
            load_entries(file, archive, staged)
        }
    }

    fn store(out: &File, archive: &Path, staged: &MemoryFs) -> io::Result<usize> {
        let entries = staged.snapshot();
        if gzipped(archive) {
            let enc = write_entries(GzEncoder::new(out, Compression::default()), &entries)?;
            enc.finish()?;
        } else {
            write_entries(out, &entries)?;
        }
        Ok(entries.len())
    }
}

fn load_entries<R: Read>(reader: R, archive: &Path, staged: &MemoryFs) -> BackendResult<()> {
    let mut ar = tar::Archive::new(reader);
    let entries = ar
        .entries()
        .map_err(io_error_with_help("read archive", archive))?;
    for entry in entries {
        let mut entry = entry.map_err(io_error_with_help("read archive entry", archive))?;
        let raw = entry
            .path()
            .map_err(io_error_with_help("decode archive entry path", archive))?
            .to_string_lossy()
            .replace('\\', "/");
        let norm = path::normalize(&raw)?;
        if norm.is_empty() {
            continue;
        }
        let kind = entry.header().entry_type();
        if kind.is_dir() {
            staged.make_dirs(&norm)?;
        } else if kind.is_file() {
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(io_error_with_help("read archive entry", archive))?;
            staged.make_dirs(path::parent(&norm))?;
            staged.write_bytes(&norm, &data)?;
        } else {
            debug!(entry = %norm, ?kind, "skipping unsupported archive entry");
        }
    }
    Ok(())
}

fn write_entries<W: Write>(writer: W, entries: &[(String, Node)]) -> io::Result<W> {
    let mtime = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let mut builder = tar::Builder::new(writer);
    for (key, node) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_mtime(mtime);
        match node {
            Node::Dir => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                builder.append_data(&mut header, format!("{key}/"), io::empty())?;
            }
            Node::File(data) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(0o644);
                header.set_size(data.len() as u64);
                builder.append_data(&mut header, key, data.as_slice())?;
            }
        }
    }
    builder.into_inner()
}
