#![forbid(unsafe_code)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::pak::error::{PakError, PakResult};
use crate::pak::path::{has_excluded_extension, normalize_rel_path};

/// A file selected for packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Archive path, forward slashes, relative to the input root.
    pub logical: String,
    pub physical: PathBuf,
}

/// Lists the eligible files of every category directory under `root`.
///
/// Each category is scanned one level deep. Regular files (or symlinks to
/// them) are kept unless their extension equals `excluded_extension`. The
/// result is sorted by path bytes so enumeration order never leaks into the
/// archive.
///
/// Every category must exist; a missing one is reported before anything is
/// listed. File names must be valid UTF-8.
pub fn discover(
    root: &Path,
    categories: &[String],
    excluded_extension: &str,
) -> PakResult<Vec<SourceFile>> {
    let mut unique: Vec<&String> = Vec::with_capacity(categories.len());
    for cat in categories {
        if !unique.contains(&cat) {
            unique.push(cat);
        }
    }

    for cat in &unique {
        check_category(&root.join(cat))?;
    }

    let mut files: Vec<SourceFile> = Vec::new();
    for cat in unique {
        let dir = root.join(cat);
        let before = files.len();

        for ent in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
        {
            let ent = ent.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
                let msg = e.to_string();
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg));
                PakError::File { path, source: io }
            })?;

            let is_file = ent.file_type().is_file()
                || (ent.path_is_symlink() && ent.path().is_file());
            if !is_file || has_excluded_extension(ent.path(), excluded_extension) {
                continue;
            }

            let logical = normalize_rel_path(root, ent.path())?;
            files.push(SourceFile {
                logical,
                physical: ent.path().to_path_buf(),
            });
        }

        tracing::debug!(category = %cat, found = files.len() - before, "scanned category");
    }

    files.sort_by(|a, b| a.logical.as_bytes().cmp(b.logical.as_bytes()));
    // Logical paths map one-to-one onto files, so equal neighbours are the
    // same file reached through two spellings of a category (`tex`, `tex/.`).
    files.dedup_by(|a, b| a.logical == b.logical);
    Ok(files)
}

/// A category must be an existing directory; any other stat failure is an
/// I/O error on that directory.
fn check_category(dir: &Path) -> PakResult<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PakError::MissingCategory {
            dir: dir.to_path_buf(),
        }),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            Err(PakError::MissingCategory {
                dir: dir.to_path_buf(),
            })
        }
        Err(source) => Err(PakError::File {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
