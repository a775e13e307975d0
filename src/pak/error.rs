#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PakError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("io: {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("asset category directory is missing: {}", .dir.display())]
    MissingCategory { dir: PathBuf },

    #[error("filename too long ({len} bytes, max {max}): {path}", max = crate::pak::MAX_PATH_LEN)]
    PathTooLong { path: String, len: usize },

    #[error("file name is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("path is outside input dir: {0}")]
    Outside(String),

    #[error("invalid archive: {0}")]
    Invalid(String),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("config: {0}")]
    Config(String),

    #[error("prompt: {0}")]
    Prompt(String),
}

impl PakError {
    /// Attaches the offending path to an I/O error.
    pub fn file(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> PakError {
        let path = path.into();
        move |source| PakError::File { path, source }
    }
}

pub type PakResult<T> = Result<T, PakError>;
