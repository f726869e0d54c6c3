//! Error types for the image crate.

use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Uploaded bytes are not a recognisable image
    #[error("Invalid image")]
    Decode,

    /// Resize target has a zero (or negative) dimension
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidDimension {
        /// Computed target width
        width: i64,
        /// Computed target height
        height: i64,
    },

    /// Pixel buffer does not match its declared geometry
    #[error("Invalid pixel grid: {0}")]
    InvalidGrid(String),

    /// Encoder failure
    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

impl ImageError {
    /// Whether the error was caused by the caller's input rather than the service.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Decode | Self::InvalidDimension { .. } | Self::InvalidGrid(_) => true,
            Self::Encode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_message() {
        assert_eq!(ImageError::Decode.to_string(), "Invalid image");
    }

    #[test]
    fn test_client_classification() {
        assert!(ImageError::Decode.is_client_error());
        assert!(ImageError::InvalidDimension { width: 0, height: 0 }.is_client_error());

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let encode = ImageError::Encode(image::ImageError::IoError(io));
        assert!(!encode.is_client_error());
    }
}
