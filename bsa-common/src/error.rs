//! Common error types for BSA

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for BSA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across BSA crates
#[derive(Error, Debug)]
pub enum Error {
    /// Bytes could not be decoded as a supported raster image
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// Image decoded but is too small to produce a central crop
    #[error("Invalid image: {width}x{height} is too small for a central crop")]
    InvalidImage { width: u32, height: u32 },

    /// Label name outside the four known classes
    #[error("Unknown label: {0:?}")]
    UnknownLabel(String),

    /// Trained model failed while classifying
    #[error("Inference error: {0}")]
    Inference(String),

    /// Model artifact absent or unusable at startup
    #[error("Missing model artifact {}: {reason}", path.display())]
    MissingModelArtifact { path: PathBuf, reason: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
