//! Colour to luminance conversion.

use crate::{Channels, PixelGrid};

// BT.601 luma weights scaled by 2^14.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Convert an RGB grid to a single-channel luma grid of the same size.
///
/// Uses `0.299 R + 0.587 G + 0.114 B` in fixed point, rounded to nearest.
/// A grid that is already grayscale is returned unchanged.
pub fn grayscale(grid: &PixelGrid) -> PixelGrid {
    if grid.channels() == Channels::Gray {
        return grid.clone();
    }

    let data: Vec<u8> = grid
        .as_bytes()
        .chunks_exact(3)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect();

    PixelGrid::from_parts(grid.width(), grid.height(), Channels::Gray, data)
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT;
    ((weighted + (1 << (SHIFT - 1))) >> SHIFT) as u8
}
