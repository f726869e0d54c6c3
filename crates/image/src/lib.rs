//! Image transformation pipeline for Citra.
//!
//! This crate provides:
//! - Decoding uploads into a [`PixelGrid`] and encoding it as PNG or JPEG
//! - Output format selection from the uploaded file name
//! - Grayscale conversion
//! - Edge blur (sharp centre circle over a Gaussian-blurred frame)
//! - Percentage resizing
//!
//! Every function is pure over its inputs; nothing is cached between calls.

#![warn(missing_docs)]

mod blur;
mod codec;
mod error;
mod format;
mod grayscale;
mod grid;
mod resize;

pub use blur::{blur_edges, default_sigma, gaussian_blur, gaussian_kernel, CircleMask, BLUR_KERNEL_SIZE};
pub use codec::{decode, encode, DEFAULT_JPEG_QUALITY};
pub use error::{ImageError, Result};
pub use format::{file_extension, select_format, FormatSelection, ImageFormat};
pub use grayscale::grayscale;
pub use grid::{Channels, PixelGrid};
pub use resize::{resize, target_dimensions, DEFAULT_PERCENTAGE, MAX_TARGET_PIXELS};
