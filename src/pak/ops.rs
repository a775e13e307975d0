#![forbid(unsafe_code)]

use std::fs::File;
use std::path::{Component, Path};

use crate::pak::error::{PakError, PakResult};
use crate::pak::format::EntryInfo;
use crate::pak::read::{check_layout, read_header, read_index, read_payload};

pub use crate::pak::build::build;

/// Read archive index entries (without inflating payloads).
pub fn entries(pak: &Path) -> PakResult<Vec<EntryInfo>> {
    let mut f = File::open(pak).map_err(PakError::file(pak))?;
    let entries = read_index(&mut f)?;
    Ok(entries.into_iter().map(EntryInfo::from).collect())
}

pub fn list(pak: &Path, verbose: bool) -> PakResult<()> {
    for e in entries(pak)? {
        if verbose {
            println!(
                "{}  off={} len={} raw={} adler32={:08x}",
                e.path, e.payload_offset, e.compressed_len, e.raw_len, e.checksum
            );
        } else {
            println!("{}", e.path);
        }
    }
    Ok(())
}

pub fn extract(pak: &Path, output: &Path, filter: &[String]) -> PakResult<usize> {
    let mut f = File::open(pak).map_err(PakError::file(pak))?;
    let header = read_header(&mut f)?;
    let entries = read_index(&mut f)?;
    check_layout(&entries, header.index_offset)?;
    std::fs::create_dir_all(output).map_err(PakError::file(output))?;

    let mut written = 0;
    for e in entries {
        if !filter.is_empty() && !filter.iter().any(|s| e.path.contains(s)) {
            continue;
        }

        let rel = Path::new(&e.path);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(PakError::Outside(e.path.clone()));
        }

        let raw = read_payload(&mut f, &e, header.index_offset)?;

        let out_path = output.join(rel);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(PakError::file(parent))?;
        }
        std::fs::write(&out_path, &raw).map_err(PakError::file(&out_path))?;
        tracing::debug!(path = %e.path, bytes = raw.len(), "extracted");
        written += 1;
    }

    tracing::info!(count = written, "extracted to {}", output.display());
    Ok(written)
}

/// Full structural check plus inflate-and-checksum of every entry.
pub fn verify(pak: &Path) -> PakResult<usize> {
    let mut f = File::open(pak).map_err(PakError::file(pak))?;
    let header = read_header(&mut f)?;
    let entries = read_index(&mut f)?;

    check_layout(&entries, header.index_offset)?;
    for e in &entries {
        read_payload(&mut f, e, header.index_offset)?;
    }

    println!("ok: {} entries", entries.len());
    Ok(entries.len())
}
