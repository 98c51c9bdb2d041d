/// Artifact decoding
///
/// This module handles:
/// - Sniffing whether an artifact is FITS or a common raster format
/// - Decoding it into a 2D `f32` pixel array (row 0 = bottom of the image)
/// - Enhancing pixel arrays for display

pub mod enhance;
pub mod fits;

use ndarray::{s, Array2};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Decoded image plane, indexed `[row, column]`
pub type PixelArray = Array2<f32>;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", path.display())]
    Missing { path: PathBuf },
    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode artifact {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
}

/// Open and decode the artifact at `path`
pub fn decode_artifact(path: &Path) -> Result<PixelArray, ArtifactError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ArtifactError::Missing {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let decode_err = |reason: String| ArtifactError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let pixels = if fits::is_fits(&bytes) {
        fits::read_primary(path).map_err(|e| decode_err(e.to_string()))?
    } else {
        decode_raster(&bytes).map_err(decode_err)?
    };

    if pixels.is_empty() {
        return Err(decode_err("image has no pixels".to_string()));
    }

    debug!(
        "Decoded {} ({}x{})",
        path.display(),
        pixels.ncols(),
        pixels.nrows()
    );
    Ok(pixels)
}

/// Decode PNG/JPEG/TIFF/... into luminance values in [0, 1]
fn decode_raster(bytes: &[u8]) -> Result<PixelArray, String> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| e.to_string())?
        .to_luma32f();
    let (width, height) = img.dimensions();
    let array = Array2::from_shape_vec((height as usize, width as usize), img.into_raw())
        .map_err(|e| e.to_string())?;
    // Raster formats store the top row first; flip so row 0 is the bottom like FITS
    Ok(flip_rows(&array))
}

/// Reverse row order
pub fn flip_rows(array: &PixelArray) -> PixelArray {
    array.slice(s![..;-1, ..]).to_owned()
}

#[cfg(test)]
pub(crate) mod test_utils {
    use image::{GrayImage, ImageFormat, Luma};
    use std::path::Path;

    /// Write a `width` x `height` gradient PNG to `path`, regardless of its extension
    pub fn write_png(path: &Path, width: u32, height: u32) {
        let img = GrayImage::from_fn(width, height, |x, y| Luma([((x + y * width) % 256) as u8]));
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }
}
