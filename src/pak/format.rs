#![forbid(unsafe_code)]

use crate::pak::error::{PakError, PakResult};

/// RI_0 header magic.
pub const MAGIC: [u8; 4] = *b"RI_0";

/// Magic + u32 entry count + u64 index offset.
pub const HEADER_LEN: u64 = 16;

/// Width of the NUL-padded path field in an index record.
pub const PATH_FIELD_LEN: usize = 36;

/// Longest storable path; the field always keeps one trailing NUL.
pub const MAX_PATH_LEN: usize = PATH_FIELD_LEN - 1;

/// path[36] + u32 adler32 + u64 offset + u64 compressed + u64 uncompressed.
pub const RECORD_LEN: usize = PATH_FIELD_LEN + 4 + 8 + 8 + 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub entry_count: u32,
    pub index_offset: u64,
}

impl Header {
    pub fn encode(&self) -> [u8; HEADER_LEN as usize] {
        let mut out = [0u8; HEADER_LEN as usize];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.entry_count.to_le_bytes());
        out[8..16].copy_from_slice(&self.index_offset.to_le_bytes());
        out
    }

    pub fn decode(buf: &[u8; HEADER_LEN as usize]) -> PakResult<Self> {
        if buf[0..4] != MAGIC {
            return Err(PakError::Invalid("bad header magic".into()));
        }
        let mut count = [0u8; 4];
        count.copy_from_slice(&buf[4..8]);
        let mut offset = [0u8; 8];
        offset.copy_from_slice(&buf[8..16]);
        Ok(Self {
            entry_count: u32::from_le_bytes(count),
            index_offset: u64::from_le_bytes(offset),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub path: String,
    pub checksum: u32,
    pub payload_offset: u64,
    pub compressed_len: u64,
    pub raw_len: u64,
}

impl Entry {
    /// Serializes one fixed-size index record.
    ///
    /// Callers are expected to have checked the path length already; an
    /// oversized path is still rejected here rather than truncated.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> PakResult<()> {
        let p = self.path.as_bytes();
        if p.len() > MAX_PATH_LEN {
            return Err(PakError::PathTooLong {
                path: self.path.clone(),
                len: p.len(),
            });
        }

        let mut name = [0u8; PATH_FIELD_LEN];
        name[..p.len()].copy_from_slice(p);
        out.extend_from_slice(&name);
        out.extend_from_slice(&self.checksum.to_le_bytes());
        out.extend_from_slice(&self.payload_offset.to_le_bytes());
        out.extend_from_slice(&self.compressed_len.to_le_bytes());
        out.extend_from_slice(&self.raw_len.to_le_bytes());
        Ok(())
    }

    pub fn decode(rec: &[u8]) -> PakResult<Self> {
        if rec.len() != RECORD_LEN {
            return Err(PakError::Invalid(format!(
                "index record is {} bytes, expected {RECORD_LEN}",
                rec.len()
            )));
        }

        let (name, rest) = rec.split_at(PATH_FIELD_LEN);
        let nul = name
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| PakError::Invalid("path field is not NUL-terminated".into()))?;
        if nul == 0 {
            return Err(PakError::Invalid("empty path in index".into()));
        }
        let path = std::str::from_utf8(&name[..nul])
            .map_err(|_| PakError::Invalid("path is not utf8".into()))?
            .to_string();

        let u64_at = |at: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&rest[at..at + 8]);
            u64::from_le_bytes(b)
        };
        let mut sum = [0u8; 4];
        sum.copy_from_slice(&rest[0..4]);

        Ok(Self {
            path,
            checksum: u32::from_le_bytes(sum),
            payload_offset: u64_at(4),
            compressed_len: u64_at(12),
            raw_len: u64_at(20),
        })
    }
}

/// Public view of an archive entry (for listing and inspection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub path: String,
    pub payload_offset: u64,
    pub compressed_len: u64,
    pub raw_len: u64,
    /// Adler-32 of the raw, uncompressed bytes.
    pub checksum: u32,
}

impl From<Entry> for EntryInfo {
    fn from(e: Entry) -> Self {
        Self {
            path: e.path,
            payload_offset: e.payload_offset,
            compressed_len: e.compressed_len,
            raw_len: e.raw_len,
            checksum: e.checksum,
        }
    }
}
