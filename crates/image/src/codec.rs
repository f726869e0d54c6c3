//! Decoding uploads into pixel grids and encoding them back out.

use crate::{ImageError, ImageFormat, PixelGrid, Result};
use image::ImageOutputFormat;
use std::io::Cursor;

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Decode any supported container into an RGB grid.
///
/// Grayscale, alpha and 16-bit sources are converted to 8-bit RGB; alpha is
/// dropped. Empty, corrupt or zero-sized input yields [`ImageError::Decode`].
pub fn decode(data: &[u8]) -> Result<PixelGrid> {
    if data.is_empty() {
        return Err(ImageError::Decode);
    }

    let img = image::load_from_memory(data).map_err(|e| {
        tracing::debug!(error = %e, len = data.len(), "Decode failed");
        ImageError::Decode
    })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::Decode);
    }

    Ok(PixelGrid::from(img.into_rgb8()))
}

/// Encode a grid as PNG or JPEG.
///
/// `quality` only applies to JPEG and is clamped to 1..=100.
pub fn encode(grid: PixelGrid, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    let output_format = match format {
        ImageFormat::Png => ImageOutputFormat::Png,
        ImageFormat::Jpeg => ImageOutputFormat::Jpeg(quality.clamp(1, 100)),
    };

    let img = grid.into_dynamic()?;
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, output_format)?;
    Ok(buffer.into_inner())
}
