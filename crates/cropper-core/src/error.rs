//! Error types for configuration, image sources and crop requests.

use thiserror::Error;

/// Invalid cropper configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Minimum scale must be positive and finite.
    #[error("Invalid minimum scale: {0}")]
    InvalidScale(f64),

    /// Maximum scale must be finite and not below the minimum.
    #[error("Invalid scale range: {min} to {max}")]
    ScaleRange { min: f64, max: f64 },

    /// Frame minimum size must be non-negative.
    #[error("Invalid frame minimum size: {width}x{height}")]
    FrameMinimum { width: f64, height: f64 },
}

/// Failure to read an image source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The source could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// The source is not a decodable image.
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// The URI scheme is not handled by this source.
    #[error("Unsupported image source: {0}")]
    Unsupported(String),

    /// Error reported by an external image-size service.
    #[error("{0}")]
    Service(String),
}

/// Failure of a crop request.
///
/// Every crop error is returned as a value; none of them invalidate the
/// cropper, which stays interactive afterwards.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropError {
    /// Looking up the natural image size failed.
    #[error("Could not fetch the source image: {0}")]
    SourceFetch(#[from] SourceError),

    /// The natural image size was zero or missing.
    #[error("The dimensions of the uploaded image could not be calculated")]
    Dimension,

    /// No usable crop rectangle could be derived from the measurements.
    #[error("The area to be cropped cannot be calculated")]
    UncroppableArea,

    /// The crop primitive failed; its message is kept verbatim.
    #[error("{0}")]
    NativeCrop(String),

    /// Another crop request has not settled yet.
    #[error("A crop request is already in progress")]
    CropInProgress,
}
