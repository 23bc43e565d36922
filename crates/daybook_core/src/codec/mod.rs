//! Flat-file persistence codec for the appointment collection.
//!
//! # Responsibility
//! - Map appointments to and from the line-oriented `title,start,end` format.
//! - Read and write whole files without partial-write states.
//!
//! # Invariants
//! - Timestamps use one canonical ISO-8601 format regardless of locale.
//! - Malformed lines never abort a read; they are skipped and reported.
//! - A missing file reads as an empty collection.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod line_format;

pub use line_format::{
    decode, decode_with_report, encode, encode_line, read_file, read_from, write_file, write_to,
    DecodeReport, SkipReason, SkippedLine, TIMESTAMP_FORMAT,
};

pub type CodecResult<T> = Result<T, CodecError>;

/// I/O failure while reading or writing the persisted file.
#[derive(Debug)]
pub enum CodecError {
    Read {
        path: Option<PathBuf>,
        source: std::io::Error,
    },
    Write {
        path: Option<PathBuf>,
        source: std::io::Error,
    },
}

impl CodecError {
    pub(crate) fn read(path: Option<PathBuf>, source: std::io::Error) -> Self {
        Self::Read { path, source }
    }

    pub(crate) fn write(path: Option<PathBuf>, source: std::io::Error) -> Self {
        Self::Write { path, source }
    }
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read {
                path: Some(path),
                source,
            } => write!(f, "failed to read `{}`: {source}", path.display()),
            Self::Read { path: None, source } => write!(f, "failed to read appointments: {source}"),
            Self::Write {
                path: Some(path),
                source,
            } => write!(f, "failed to write `{}`: {source}", path.display()),
            Self::Write { path: None, source } => {
                write!(f, "failed to write appointments: {source}")
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
        }
    }
}
