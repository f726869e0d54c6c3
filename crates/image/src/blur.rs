//! Edge blur: Gaussian-blur the frame, keep a sharp circle in the middle.

use crate::PixelGrid;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Side length of the square blur kernel.
pub const BLUR_KERNEL_SIZE: usize = 61;

/// Blur everything outside a centred circle.
///
/// The circle is described by [`CircleMask::centered`]; pixels inside it are
/// copied from the input, the rest come from a [`BLUR_KERNEL_SIZE`] Gaussian
/// blur of the whole image.
pub fn blur_edges(grid: &PixelGrid) -> PixelGrid {
    let mask = CircleMask::centered(grid.width(), grid.height());
    let mut blurred = gaussian_blur(grid, BLUR_KERNEL_SIZE);

    let stride = grid.width() as usize * grid.channels().count();
    let channels = grid.channels().count();
    let source = grid.as_bytes();

    for y in 0..grid.height() {
        if let Some((start, end)) = mask.row_span(y) {
            let row = y as usize * stride;
            let (from, to) = (row + start as usize * channels, row + end as usize * channels);
            blurred.data_mut()[from..to].copy_from_slice(&source[from..to]);
        }
    }

    blurred
}

/// A filled circle used to pick sharp pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleMask {
    width: u32,
    center_x: u32,
    center_y: u32,
    radius: u32,
}

impl CircleMask {
    /// The mask for a `width` × `height` image.
    ///
    /// Center is `(width / 2, height / 2)` and the radius is
    /// `min(width, height) / 1.5` truncated toward zero, computed exactly as
    /// `2 * min / 3`.
    pub fn centered(width: u32, height: u32) -> Self {
        let radius = (u64::from(width.min(height)) * 2 / 3) as u32;
        Self {
            width,
            center_x: width / 2,
            center_y: height / 2,
            radius,
        }
    }

    /// Circle radius in pixels.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Circle center.
    pub fn center(&self) -> (u32, u32) {
        (self.center_x, self.center_y)
    }

    /// Whether (`x`, `y`) lies inside or on the circle.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        let dx = u64::from(x.abs_diff(self.center_x));
        let dy = u64::from(y.abs_diff(self.center_y));
        let r = u64::from(self.radius);
        dx * dx + dy * dy <= r * r
    }

    /// Half-open range of `x` inside the circle on row `y`, clipped to the image.
    fn row_span(&self, y: u32) -> Option<(u32, u32)> {
        let dy = u64::from(y.abs_diff(self.center_y));
        let r = u64::from(self.radius);
        if dy > r {
            return None;
        }

        let half = (r * r - dy * dy).isqrt();
        let start = u64::from(self.center_x).saturating_sub(half) as u32;
        let end = (u64::from(self.center_x) + half + 1).min(u64::from(self.width)) as u32;
        (start < end).then_some((start, end))
    }
}

/// Gaussian sigma for a kernel of `size` taps when none is given.
pub fn default_sigma(size: usize) -> f64 {
    0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised 1-D Gaussian kernel of `size` taps with the default sigma.
pub fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = default_sigma(size);
    let mid = (size as f64 - 1.0) / 2.0;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - mid;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Separable Gaussian blur with a `size` × `size` kernel.
///
/// Borders reflect without repeating the edge pixel (`dcb|abcd|cba`).
pub fn gaussian_blur(grid: &PixelGrid, size: usize) -> PixelGrid {
    let kernel = gaussian_kernel(size);
    let radius = size / 2;
    let (width, height) = (grid.width() as usize, grid.height() as usize);
    let channels = grid.channels().count();
    let stride = width * channels;
    let source = grid.as_bytes();

    let columns = reflected_indices(width, radius);
    let rows = reflected_indices(height, radius);

    let mut horizontal = vec![0f32; stride * height];
    for_each_row(&mut horizontal, stride, |y, out| {
        let line = &source[y * stride..(y + 1) * stride];
        for x in 0..width {
            for c in 0..channels {
                let mut acc = 0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    acc += w * f32::from(line[columns[x + k] * channels + c]);
                }
                out[x * channels + c] = acc;
            }
        }
    });

    let mut output = vec![0u8; stride * height];
    for_each_row(&mut output, stride, |y, out| {
        let mut acc = vec![0f32; stride];
        for (k, &w) in kernel.iter().enumerate() {
            let src = rows[y + k] * stride;
            for (a, &v) in acc.iter_mut().zip(&horizontal[src..src + stride]) {
                *a += w * v;
            }
        }
        for (o, a) in out.iter_mut().zip(acc) {
            *o = a.round().clamp(0.0, 255.0) as u8;
        }
    });

    PixelGrid::from_parts(grid.width(), grid.height(), grid.channels(), output)
}

/// Source index for every padded position `-radius .. len + radius`.
fn reflected_indices(len: usize, radius: usize) -> Vec<usize> {
    (0..len + 2 * radius)
        .map(|i| reflect_101(i as isize - radius as isize, len))
        .collect()
}

fn reflect_101(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let n = len as isize;
    // Kernels wider than the image need several bounces.
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * n - 2 - i;
        }
    }
    i as usize
}

fn for_each_row<T, F>(buffer: &mut [T], stride: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    buffer
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    buffer
        .chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Channels;
    use proptest::prelude::*;

    fn checkerboard(width: u32, height: u32) -> PixelGrid {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        PixelGrid::new(width, height, Channels::Rgb, data).unwrap()
    }

    #[test]
    fn test_default_sigma() {
        assert!((default_sigma(61) - 9.5).abs() < 1e-9);
    }

    #[test]
    fn test_kernel_is_normalised_and_symmetric() {
        let kernel = gaussian_kernel(BLUR_KERNEL_SIZE);
        assert_eq!(kernel.len(), 61);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert_eq!(kernel[0], kernel[60]);
        assert!(kernel[30] > kernel[29]);
    }

    #[test]
    fn test_reflect_101() {
        let idx: Vec<usize> = (-3..7).map(|i| reflect_101(i, 4)).collect();
        assert_eq!(idx, vec![3, 2, 1, 0, 1, 2, 3, 2, 1, 0]);
        assert_eq!(reflect_101(-30, 1), 0);
        // Bounces repeatedly on a two-pixel line
        assert_eq!(reflect_101(-30, 2), 0);
        assert_eq!(reflect_101(31, 2), 1);
    }

    #[test]
    fn test_mask_geometry() {
        let mask = CircleMask::centered(300, 150);
        assert_eq!(mask.center(), (150, 75));
        assert_eq!(mask.radius(), 100);

        // 10 / 1.5 = 6.67, truncated
        assert_eq!(CircleMask::centered(10, 10).radius(), 6);
        assert_eq!(CircleMask::centered(1, 1).radius(), 0);
    }

    #[test]
    fn test_row_span_matches_contains() {
        for (w, h) in [(1, 1), (2, 2), (7, 3), (30, 20), (64, 200)] {
            let mask = CircleMask::centered(w, h);
            for y in 0..h {
                let span = mask.row_span(y);
                for x in 0..w {
                    let in_span = span.is_some_and(|(s, e)| (s..e).contains(&x));
                    assert_eq!(in_span, mask.contains(x, y), "{w}x{h} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let grid = PixelGrid::filled(40, 30, Channels::Rgb, &[200, 100, 50]).unwrap();
        assert_eq!(gaussian_blur(&grid, BLUR_KERNEL_SIZE), grid);
    }

    #[test]
    fn test_corners_blurred_center_sharp() {
        let grid = checkerboard(120, 120);
        let result = blur_edges(&grid);

        assert_eq!(result.pixel(60, 60), grid.pixel(60, 60));
        // The corner lies outside the radius-80 circle
        let corner = result.pixel(0, 0)[0];
        assert!((100..=155).contains(&corner), "corner was {corner}");
    }

    #[test]
    fn test_single_pixel_image_is_sharp() {
        let grid = PixelGrid::filled(1, 1, Channels::Rgb, &[9, 8, 7]).unwrap();
        assert_eq!(blur_edges(&grid), grid);
    }

    #[test]
    fn test_gray_grid_supported() {
        let grid = PixelGrid::filled(12, 8, Channels::Gray, &[77]).unwrap();
        let result = blur_edges(&grid);
        assert_eq!(result.channels(), Channels::Gray);
        assert_eq!(result, grid);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_keeps_dimensions_and_center(w in 1u32..40, h in 1u32..40, seed in any::<u8>()) {
            let data: Vec<u8> = (0..(w * h * 3)).map(|i| (i as u8).wrapping_mul(seed) ^ seed).collect();
            let grid = PixelGrid::new(w, h, Channels::Rgb, data).unwrap();
            let result = blur_edges(&grid);

            prop_assert_eq!((result.width(), result.height()), (w, h));
            prop_assert_eq!(result.channels(), grid.channels());
            prop_assert_eq!(result.pixel(w / 2, h / 2), grid.pixel(w / 2, h / 2));
        }
    }
}
