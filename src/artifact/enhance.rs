/// Display enhancement for survey cutouts
///
/// Survey data spans a huge dynamic range, so images are smoothed, log-scaled
/// and normalized to [0, 1] before they are turned into 8-bit textures.

use image::{imageops, GrayImage, ImageBuffer, Luma};
use ndarray::Array2;

use super::PixelArray;

/// Default Gaussian sigma in pixels
pub const DEFAULT_SIGMA: f32 = 1.0;

/// Smallest and largest finite values, or `None` when there are none
pub fn value_range(pixels: &PixelArray) -> Option<(f32, f32)> {
    pixels
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// How normalized gray levels map back to data values
///
/// A level `g` in [0, 1] shows the value `offset + exp_m1(g * log_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayScale {
    pub offset: f32,
    pub log_max: f32,
}

impl DisplayScale {
    /// Data value shown at gray `level`
    pub fn value_at(&self, level: f32) -> f32 {
        self.offset + (level.clamp(0.0, 1.0) * self.log_max).exp_m1()
    }
}

/// Gaussian blur, then `ln(1 + (v - min))`, then scale to [0, 1]
///
/// Non-finite pixels are treated as the image minimum. A flat image maps to zeros.
pub fn enhance(pixels: &PixelArray, sigma: f32) -> PixelArray {
    enhance_with_scale(pixels, sigma).0
}

/// Same as [`enhance`], also returning the mapping from gray level to data value
pub fn enhance_with_scale(pixels: &PixelArray, sigma: f32) -> (PixelArray, DisplayScale) {
    let (rows, cols) = pixels.dim();
    let zeros = || (Array2::zeros((rows, cols)), DisplayScale::default());
    let Some((min, _)) = value_range(pixels) else {
        return zeros();
    };

    let cleaned: Vec<f32> = pixels
        .iter()
        .map(|&v| if v.is_finite() { v - min } else { 0.0 })
        .collect();

    let smoothed = if sigma > 0.0 {
        match ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(cols as u32, rows as u32, cleaned) {
            Some(buffer) => imageops::blur(&buffer, sigma).into_raw(),
            None => return zeros(),
        }
    } else {
        cleaned
    };

    // Blur can undershoot slightly at sharp edges
    let floor = smoothed.iter().copied().fold(f32::INFINITY, f32::min);
    let logged: Vec<f32> = smoothed.iter().map(|&v| (v - floor).ln_1p()).collect();

    let max = logged.iter().copied().fold(0.0_f32, f32::max);
    let normalized: Vec<f32> = if max > 0.0 {
        logged.iter().map(|&v| (v / max).clamp(0.0, 1.0)).collect()
    } else {
        vec![0.0; logged.len()]
    };

    let scale = DisplayScale {
        offset: min + floor,
        log_max: max,
    };
    match Array2::from_shape_vec((rows, cols), normalized) {
        Ok(array) => (array, scale),
        Err(_) => zeros(),
    }
}

/// Map a normalized array to 8-bit grayscale
///
/// Row 0 of the array is drawn at the bottom (lower-left origin).
pub fn to_luma8(normalized: &PixelArray) -> GrayImage {
    let (rows, cols) = normalized.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let v = normalized[[rows - 1 - y as usize, x as usize]];
        Luma([(v.clamp(0.0, 1.0) * 255.0).round() as u8])
    })
}

/// Downsample a normalized array to at most `cells` x `cells` block averages
///
/// Used for drawing coarse sprite textures. Row 0 of the result is the top.
pub fn coarse_grid(normalized: &PixelArray, cells: usize) -> Array2<f32> {
    let (rows, cols) = normalized.dim();
    let out_rows = rows.min(cells).max(1);
    let out_cols = cols.min(cells).max(1);
    if rows == 0 || cols == 0 {
        return Array2::zeros((out_rows, out_cols));
    }

    Array2::from_shape_fn((out_rows, out_cols), |(r, c)| {
        // Top row of the output comes from the last rows of the input
        let top = r * rows / out_rows;
        let bottom = ((r + 1) * rows / out_rows).max(top + 1);
        let left = c * cols / out_cols;
        let right = ((c + 1) * cols / out_cols).max(left + 1);

        let mut sum = 0.0;
        for row in top..bottom {
            for col in left..right {
                sum += normalized[[rows - 1 - row, col]];
            }
        }
        sum / ((bottom - top) * (right - left)) as f32
    })
}
