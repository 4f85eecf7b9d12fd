//! Error types for the media mover

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media mover operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media mover
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to extract video metadata from {path}: {message}")]
    VideoMetadata { path: PathBuf, message: String },

    #[error("Destination file {destination} already exists, could not rename {source_path}")]
    DestinationExists {
        source_path: PathBuf,
        destination: PathBuf,
    },

    #[error("`{command}` exited with status {status}: {stderr}")]
    ExternalTool {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Missing required application: {0}")]
    MissingBinary(String),

    #[error("Invalid file naming pattern: {0}")]
    NamingPattern(String),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}
