//! Percentage resizing with linear interpolation.

use crate::{Channels, ImageError, PixelGrid, Result};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, Rgb};

/// Percentage applied when the caller does not supply one.
pub const DEFAULT_PERCENTAGE: i64 = 50;

/// Largest accepted resize target in pixels.
///
/// The linear filter keeps a 16-byte intermediate per output pixel, so this
/// bounds a single resize to roughly 1 GiB.
pub const MAX_TARGET_PIXELS: u64 = 64 * 1024 * 1024;

/// Compute `floor(dimension * percentage / 100)` for both axes.
///
/// Any percentage is accepted, including upscales above 100. A result with a
/// zero or negative dimension, or one above [`MAX_TARGET_PIXELS`], is rejected
/// with [`ImageError::InvalidDimension`].
pub fn target_dimensions(width: u32, height: u32, percentage: i64) -> Result<(u32, u32)> {
    let scale = |dimension: u32| i128::from(dimension) * i128::from(percentage) / 100;
    let (new_width, new_height) = (scale(width), scale(height));

    match (u32::try_from(new_width), u32::try_from(new_height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 && u64::from(w) * u64::from(h) <= MAX_TARGET_PIXELS => {
            Ok((w, h))
        }
        _ => Err(ImageError::InvalidDimension {
            width: saturate(new_width),
            height: saturate(new_height),
        }),
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// Resize a grid by `percentage`, keeping its channel layout.
pub fn resize(grid: &PixelGrid, percentage: i64) -> Result<PixelGrid> {
    let (width, height) = (grid.width(), grid.height());
    let (new_width, new_height) = target_dimensions(width, height, percentage)?;

    tracing::debug!(width, height, new_width, new_height, percentage, "Resizing");

    let mismatch = || ImageError::InvalidGrid("buffer does not match dimensions".into());
    let resized = match grid.channels() {
        Channels::Gray => {
            let view: ImageBuffer<Luma<u8>, &[u8]> =
                ImageBuffer::from_raw(width, height, grid.as_bytes()).ok_or_else(mismatch)?;
            PixelGrid::from(imageops::resize(&view, new_width, new_height, FilterType::Triangle))
        }
        Channels::Rgb => {
            let view: ImageBuffer<Rgb<u8>, &[u8]> =
                ImageBuffer::from_raw(width, height, grid.as_bytes()).ok_or_else(mismatch)?;
            PixelGrid::from(imageops::resize(&view, new_width, new_height, FilterType::Triangle))
        }
    };

    Ok(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_percentage_halves() {
        assert_eq!(target_dimensions(100, 50, DEFAULT_PERCENTAGE).unwrap(), (50, 25));
    }

    #[test]
    fn test_floor_rounding() {
        assert_eq!(target_dimensions(33, 99, 50).unwrap(), (16, 49));
        assert_eq!(target_dimensions(10, 10, 150).unwrap(), (15, 15));
    }

    #[test]
    fn test_zero_target_rejected() {
        assert!(matches!(
            target_dimensions(10, 10, 5),
            Err(ImageError::InvalidDimension { width: 0, height: 0 })
        ));
        // Only one axis collapses
        assert!(matches!(
            target_dimensions(3, 200, 10),
            Err(ImageError::InvalidDimension { width: 0, height: 20 })
        ));
        assert!(target_dimensions(10, 10, 0).is_err());
        assert!(target_dimensions(10, 10, -50).is_err());
    }

    #[test]
    fn test_huge_percentage_does_not_overflow() {
        assert!(matches!(
            target_dimensions(u32::MAX, u32::MAX, i64::MAX),
            Err(ImageError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_oversized_target_rejected() {
        assert!(matches!(
            target_dimensions(100, 100, 10_000_000),
            Err(ImageError::InvalidDimension { width: 10_000_000, height: 10_000_000 })
        ));

        let grid = PixelGrid::filled(100, 100, Channels::Rgb, &[1, 2, 3]).unwrap();
        assert!(matches!(
            resize(&grid, 10_000_000),
            Err(ImageError::InvalidDimension { .. })
        ));

        // 8192 x 8192 sits exactly on the budget
        assert_eq!(target_dimensions(100, 100, 819_200).unwrap(), (8192, 8192));
        assert!(target_dimensions(100, 100, 819_300).is_err());
    }

    #[test]
    fn test_resize_keeps_layout_and_colour() {
        let grid = PixelGrid::filled(40, 20, Channels::Rgb, &[10, 120, 250]).unwrap();
        let small = resize(&grid, 25).unwrap();
        assert_eq!((small.width(), small.height()), (10, 5));
        assert_eq!(small.channels(), Channels::Rgb);
        assert_eq!(small.pixel(4, 2), &[10, 120, 250]);

        let gray = PixelGrid::filled(8, 8, Channels::Gray, &[90]).unwrap();
        let big = resize(&gray, 200).unwrap();
        assert_eq!((big.width(), big.height()), (16, 16));
        assert_eq!(big.channels(), Channels::Gray);
        assert_eq!(big.pixel(15, 15), &[90]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_dimensions_follow_percentage(w in 1u32..64, h in 1u32..64, p in 1i64..300) {
            let grid = PixelGrid::filled(w, h, Channels::Rgb, &[1, 2, 3]).unwrap();
            let expected_w = u64::from(w) * p as u64 / 100;
            let expected_h = u64::from(h) * p as u64 / 100;

            match resize(&grid, p) {
                Ok(out) => {
                    prop_assert_eq!(u64::from(out.width()), expected_w);
                    prop_assert_eq!(u64::from(out.height()), expected_h);
                }
                Err(ImageError::InvalidDimension { .. }) => {
                    prop_assert!(expected_w == 0 || expected_h == 0);
                }
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }
        }
    }
}
