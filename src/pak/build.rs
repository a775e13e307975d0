#![forbid(unsafe_code)]

use adler2::Adler32;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::pak::config::PackConfig;
use crate::pak::discover::{discover, SourceFile};
use crate::pak::error::{PakError, PakResult};
use crate::pak::format::{Entry, Header, HEADER_LEN, RECORD_LEN};
use crate::pak::path::check_path_len;

/// Adler-32 of `raw` (zlib's checksum, seeded with 1).
pub(crate) fn checksum(raw: &[u8]) -> u32 {
    let mut hasher = Adler32::new();
    hasher.write_slice(raw);
    hasher.checksum()
}

/// zlib stream of `raw` at the default level. No stored fallback.
pub(crate) fn compress(raw: &[u8]) -> PakResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(raw.len() / 2), Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Summary of a finished archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub entries: u32,
    pub payload_len: u64,
    pub index_offset: u64,
    pub total_len: u64,
}

/// RI_0 layout:
/// - header:
///   - [MAGIC "RI_0"]
///   - [u32 entry_count]
///   - [u64 index_offset]
/// - payload blobs (zlib), back to back, in entry order
/// - index, one 64-byte record per entry:
///   - [u8 path[36], NUL padded]
///   - [u32 adler32 of raw bytes]
///   - [u64 payload_offset]
///   - [u64 compressed_len]
///   - [u64 raw_len]
///
/// Payload and index are accumulated in memory so the header can be written
/// with its final index offset and the output never needs to seek.
///
/// Entries must be pushed in sorted path order; the writer enforces it.
#[derive(Debug, Default)]
pub(crate) struct ArchiveWriter {
    payload: Vec<u8>,
    entries: Vec<Entry>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checksums, compresses and appends one file.
    pub fn push(&mut self, path: String, raw: &[u8]) -> PakResult<&Entry> {
        check_path_len(&path)?;
        if let Some(last) = self.entries.last() {
            if last.path.as_bytes() >= path.as_bytes() {
                return Err(PakError::Invalid(format!(
                    "entries out of order: {} after {}",
                    path, last.path
                )));
            }
        }
        if self.entries.len() >= u32::MAX as usize {
            return Err(PakError::Invalid("too many entries for a u32 count".into()));
        }

        let payload_offset = HEADER_LEN + self.payload.len() as u64;
        let compressed = compress(raw)?;
        self.payload.extend_from_slice(&compressed);

        self.entries.push(Entry {
            path,
            checksum: checksum(raw),
            payload_offset,
            compressed_len: compressed.len() as u64,
            raw_len: raw.len() as u64,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Emits header, payload region and index region in one forward pass.
    pub fn finish<W: Write>(self, out: &mut W) -> PakResult<BuildStats> {
        let mut index_buf: Vec<u8> = Vec::with_capacity(self.entries.len() * RECORD_LEN);
        for e in &self.entries {
            e.encode_into(&mut index_buf)?;
        }

        let payload_len = self.payload.len() as u64;
        let header = Header {
            entry_count: self.entries.len() as u32,
            index_offset: HEADER_LEN + payload_len,
        };

        out.write_all(&header.encode())?;
        out.write_all(&self.payload)?;
        out.write_all(&index_buf)?;
        out.flush()?;

        Ok(BuildStats {
            entries: header.entry_count,
            payload_len,
            index_offset: header.index_offset,
            total_len: header.index_offset + index_buf.len() as u64,
        })
    }
}

/// Reads and packs already-discovered files into an in-memory archive.
pub(crate) fn pack_files(files: Vec<SourceFile>) -> PakResult<ArchiveWriter> {
    let mut writer = ArchiveWriter::new();
    for file in files {
        tracing::info!("{}", file.logical);
        // Fail before reading anything we could never store.
        check_path_len(&file.logical)?;

        let raw = fs::read(&file.physical).map_err(PakError::file(&file.physical))?;
        let e = writer.push(file.logical, &raw)?;
        tracing::debug!(
            path = %e.path,
            raw = e.raw_len,
            compressed = e.compressed_len,
            offset = e.payload_offset,
            "packed"
        );
    }
    Ok(writer)
}

/// Writes `contents` to `output` through a temp file in the same directory,
/// renamed into place only once everything has been written.
pub(crate) fn write_atomic<F, T>(output: &Path, contents: F) -> PakResult<T>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> PakResult<T>,
{
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(PakError::file(dir))?;

    let res = {
        let mut w = BufWriter::new(&mut tmp);
        let res = contents(&mut w)?;
        w.flush().map_err(PakError::file(output))?;
        res
    };
    tmp.as_file().sync_all().map_err(PakError::file(output))?;
    tmp.persist(output)
        .map_err(|e| PakError::File {
            path: output.to_path_buf(),
            source: e.error,
        })?;
    Ok(res)
}

/// Packs `files` and writes the archive to `output` atomically.
pub(crate) fn write_archive(files: Vec<SourceFile>, output: &Path) -> PakResult<BuildStats> {
    let writer = pack_files(files)?;
    write_atomic(output, |w| writer.finish(w))
}

/// Builds an RI_0 archive at `output` from the category directories of
/// `input`.
///
/// Nothing is created at `output` unless the whole build succeeds.
pub fn build(input: &Path, output: &Path, config: &PackConfig) -> PakResult<BuildStats> {
    let files = discover(input, &config.categories, &config.excluded_extension)?;
    tracing::debug!(count = files.len(), root = %input.display(), "discovered files");

    let stats = write_archive(files, output)?;

    tracing::info!(
        entries = stats.entries,
        payload = stats.payload_len,
        index_offset = stats.index_offset,
        "wrote {}",
        output.display()
    );
    Ok(stats)
}
