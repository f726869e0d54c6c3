//! In-memory decoded image.

use crate::{ImageError, Result};
use image::{DynamicImage, GrayImage, ImageBuffer, RgbImage};
use serde::{Deserialize, Serialize};

/// Channel layout of a [`PixelGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channels {
    /// Single luminance channel
    Gray,
    /// Red, green, blue (in that order)
    Rgb,
}

impl Channels {
    /// Number of bytes per pixel.
    pub fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

/// A width × height grid of 8-bit pixels stored row-major.
///
/// The byte length always equals `width * height * channels`, and both
/// dimensions are non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Wrap a raw buffer, checking it against the declared geometry.
    pub fn new(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidGrid(format!(
                "zero dimension {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(ImageError::InvalidGrid(format!(
                "expected {expected} bytes for {width}x{height} {channels:?}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Build a grid from a buffer the caller has already sized.
    pub(crate) fn from_parts(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * channels.count());
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// A grid with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, channels: Channels, pixel: &[u8]) -> Result<Self> {
        if pixel.len() != channels.count() {
            return Err(ImageError::InvalidGrid(format!(
                "fill pixel has {} bytes, {channels:?} needs {}",
                pixel.len(),
                channels.count()
            )));
        }
        let data = pixel.repeat(width as usize * height as usize);
        Self::new(width, height, channels, data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel layout.
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Raw row-major bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes of the pixel at (`x`, `y`).
    ///
    /// # Panics
    /// If the coordinates are outside the grid.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let c = self.channels.count();
        let start = (y as usize * self.width as usize + x as usize) * c;
        &self.data[start..start + c]
    }

    /// Convert into the `image` crate's representation.
    pub(crate) fn into_dynamic(self) -> Result<DynamicImage> {
        let (width, height) = (self.width, self.height);
        let image = match self.channels {
            Channels::Gray => ImageBuffer::from_raw(width, height, self.data).map(DynamicImage::ImageLuma8),
            Channels::Rgb => ImageBuffer::from_raw(width, height, self.data).map(DynamicImage::ImageRgb8),
        };
        image.ok_or_else(|| ImageError::InvalidGrid("buffer does not match dimensions".into()))
    }
}

impl From<RgbImage> for PixelGrid {
    fn from(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            channels: Channels::Rgb,
            data: img.into_raw(),
        }
    }
}

impl From<GrayImage> for PixelGrid {
    fn from(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            channels: Channels::Gray,
            data: img.into_raw(),
        }
    }
}
