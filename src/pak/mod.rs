#![forbid(unsafe_code)]

mod build;
mod config;
mod discover;
mod error;
mod format;
mod io;
mod ops;
mod path;
mod read;

pub use build::BuildStats;
pub use config::PackConfig;

pub use error::{PakError, PakResult};
pub use format::{EntryInfo, MAX_PATH_LEN};

pub(crate) use build::write_atomic;
pub(crate) use io::write_u32;

pub use ops::{build, entries, extract, list, verify};
