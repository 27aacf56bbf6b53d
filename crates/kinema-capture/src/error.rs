//! Error types for capture export.

use thiserror::Error;

/// Errors that can occur while encoding or writing capture artifacts.
#[derive(Error, Debug)]
pub enum ExportError {
    /// No frames were supplied to the encoder.
    #[error("no frames to encode")]
    EmptySequence,

    /// A frame's buffer does not match its declared dimensions.
    #[error("frame buffer size mismatch")]
    BadFrame,

    /// Image encoding/decoding failure.
    #[error("image codec failed: {0}")]
    Codec(#[from] image::ImageError),

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
