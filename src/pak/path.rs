#![forbid(unsafe_code)]

use std::path::Path;

use crate::pak::error::{PakError, PakResult};
use crate::pak::format::MAX_PATH_LEN;

/// Path of `file_path` relative to `input_root`, joined with forward slashes.
pub fn normalize_rel_path(input_root: &Path, file_path: &Path) -> PakResult<String> {
    let rel = file_path
        .strip_prefix(input_root)
        .map_err(|_| PakError::Outside(file_path.to_string_lossy().into_owned()))?;

    let mut out = String::new();
    for (i, comp) in rel.components().enumerate() {
        if i != 0 {
            out.push('/');
        }
        let name = comp
            .as_os_str()
            .to_str()
            .ok_or_else(|| PakError::NonUtf8Path(file_path.to_path_buf()))?;
        out.push_str(name);
    }
    out = out.replace('\\', "/");

    if out.is_empty() {
        return Err(PakError::Invalid("empty relative path".into()));
    }

    Ok(out)
}

pub fn has_excluded_extension(file_path: &Path, excluded: &str) -> bool {
    if excluded.is_empty() {
        return false;
    }
    file_path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy() == excluded)
}

/// Rejects paths that do not fit the index record's NUL-padded name field.
pub fn check_path_len(rel: &str) -> PakResult<()> {
    let len = rel.len();
    if len > MAX_PATH_LEN {
        return Err(PakError::PathTooLong {
            path: rel.to_string(),
            len,
        });
    }
    Ok(())
}
