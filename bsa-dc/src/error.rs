//! Error types for bsa-dc

use std::path::PathBuf;
use thiserror::Error;

/// Fatal curation errors
///
/// Per-entry failures are not errors: they become `SkippedEntry` records
/// and the run continues.
#[derive(Debug, Error)]
pub enum CurationError {
    /// Bad `NAME=PREFIX` mapping
    #[error("Invalid label mapping: {0}")]
    InvalidMapping(String),

    /// Archive could not be opened
    #[error("Cannot open archive {0}: {1}")]
    ArchiveOpen(PathBuf, String),

    /// Archive central directory could not be read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Output CSV could not be written
    #[error("Cannot write output: {0}")]
    Output(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CurationError>;
