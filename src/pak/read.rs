#![forbid(unsafe_code)]

use flate2::read::ZlibDecoder;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::pak::build::checksum;
use crate::pak::error::{PakError, PakResult};
use crate::pak::format::{Entry, Header, HEADER_LEN, RECORD_LEN};
use crate::pak::io::read_exact;

pub(crate) fn read_header(file: &mut File) -> PakResult<Header> {
    let size = file.metadata()?.len();
    if size < HEADER_LEN {
        return Err(PakError::Invalid("file too small".into()));
    }
    file.seek(SeekFrom::Start(0))?;
    let head = read_exact::<{ HEADER_LEN as usize }>(file)?;
    Header::decode(&head)
}

/// Reads and bounds-checks the index region.
///
/// The index must start at the header's offset and run exactly to the end of
/// the file.
pub(crate) fn read_index(file: &mut File) -> PakResult<Vec<Entry>> {
    let header = read_header(file)?;
    let file_len = file.metadata()?.len();

    let index_len = header.entry_count as u64 * RECORD_LEN as u64;
    if header.index_offset < HEADER_LEN {
        return Err(PakError::Invalid("index offset inside header".into()));
    }
    if header.index_offset.checked_add(index_len) != Some(file_len) {
        return Err(PakError::Invalid(format!(
            "index of {} entries at {} does not end at file size {}",
            header.entry_count, header.index_offset, file_len
        )));
    }

    file.seek(SeekFrom::Start(header.index_offset))?;
    let mut index_buf = vec![0u8; index_len as usize];
    file.read_exact(&mut index_buf)?;

    let mut out: Vec<Entry> = Vec::with_capacity(header.entry_count as usize);
    for rec in index_buf.chunks_exact(RECORD_LEN) {
        out.push(Entry::decode(rec)?);
    }

    for w in out.windows(2) {
        if w[0].path.as_bytes().cmp(w[1].path.as_bytes()) != Ordering::Less {
            return Err(PakError::Invalid(format!(
                "index is not sorted: {} before {}",
                w[0].path, w[1].path
            )));
        }
    }

    Ok(out)
}

/// Checks that payloads tile the region between the header and the index.
pub(crate) fn check_layout(entries: &[Entry], index_offset: u64) -> PakResult<()> {
    let mut expected = HEADER_LEN;
    for e in entries {
        if e.payload_offset != expected {
            return Err(PakError::Invalid(format!(
                "payload of {} at {} (expected {})",
                e.path, e.payload_offset, expected
            )));
        }
        expected = e
            .payload_offset
            .checked_add(e.compressed_len)
            .ok_or_else(|| PakError::Invalid(format!("payload overflows: {}", e.path)))?;
    }
    if expected != index_offset {
        return Err(PakError::Invalid(format!(
            "payload region ends at {expected}, index starts at {index_offset}"
        )));
    }
    Ok(())
}

/// Reads, inflates and checks one payload against its record.
///
/// The payload must lie between the header and `index_offset`; record sizes
/// are never trusted for allocation beyond that.
pub(crate) fn read_payload(file: &mut File, e: &Entry, index_offset: u64) -> PakResult<Vec<u8>> {
    let end = e.payload_offset.checked_add(e.compressed_len);
    if e.payload_offset < HEADER_LEN || end.map_or(true, |end| end > index_offset) {
        return Err(PakError::Invalid(format!(
            "payload of {} ({} bytes at {}) is outside the payload region",
            e.path, e.compressed_len, e.payload_offset
        )));
    }

    file.seek(SeekFrom::Start(e.payload_offset))?;
    let mut payload = vec![0u8; e.compressed_len as usize];
    file.read_exact(&mut payload)?;

    // One byte past the recorded size is enough to detect a mismatch.
    let mut raw = Vec::new();
    ZlibDecoder::new(&payload[..])
        .take(e.raw_len.saturating_add(1))
        .read_to_end(&mut raw)
        .map_err(|err| PakError::Invalid(format!("corrupt payload for {}: {err}", e.path)))?;

    if raw.len() as u64 != e.raw_len {
        return Err(PakError::Invalid(format!("raw size mismatch: {}", e.path)));
    }
    if checksum(&raw) != e.checksum {
        return Err(PakError::Invalid(format!("checksum mismatch: {}", e.path)));
    }
    Ok(raw)
}
