use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading an image from disk into a frame.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode image '{path}': {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Unsupported image '{path}': {reason}")]
    Unsupported { path: PathBuf, reason: String },
}

/// Errors that can occur when writing a frame to disk.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Frame is not a valid {width}x{height}x{channels} buffer")]
    InvalidFrame {
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("Failed to write image '{path}': {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}
