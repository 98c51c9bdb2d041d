//! FITS artifacts.
//!
//! Survey cutouts are single-HDU images. Only the first image plane of the
//! primary HDU is read; cfitsio applies BSCALE/BZERO while reading.

use fitsio::hdu::HduInfo;
use fitsio::images::ImageType;
use fitsio::FitsFile;
use ndarray::Array2;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::PixelArray;

#[derive(Debug, Error)]
pub enum FitsError {
    #[error("FITS I/O error: {0}")]
    Fits(#[from] fitsio::errors::Error),
    #[error("failed to stat file: {0}")]
    Io(#[from] std::io::Error),
    #[error("primary HDU is not an image")]
    NotAnImage,
    #[error("primary HDU has {0} axes, need at least 2")]
    TooFewAxes(usize),
    #[error("image of {width}x{height} pixels is too large")]
    TooLarge { width: usize, height: usize },
    #[error("data section too short: need {need} bytes, file has {have}")]
    TruncatedData { need: u64, have: u64 },
}

/// Whether `bytes` start like a FITS file
pub fn is_fits(bytes: &[u8]) -> bool {
    bytes.len() >= 30 && bytes.starts_with(b"SIMPLE  =") && bytes[29] == b'T'
}

fn bytes_per_pixel(image_type: &ImageType) -> usize {
    match image_type {
        ImageType::UnsignedByte | ImageType::Byte => 1,
        ImageType::Short | ImageType::UnsignedShort => 2,
        ImageType::Long | ImageType::UnsignedLong | ImageType::Float => 4,
        ImageType::LongLong | ImageType::Double => 8,
    }
}

/// Read the first plane of the primary HDU
///
/// Row 0 of the result is the first row stored in the file (the bottom of the
/// image in FITS convention).
pub fn read_primary(path: &Path) -> Result<PixelArray, FitsError> {
    let file_len = fs::metadata(path)?.len();

    let mut fptr = FitsFile::open(path)?;
    let hdu = fptr.primary_hdu()?;

    let (shape, image_type) = match &hdu.info {
        HduInfo::ImageInfo { shape, image_type } => (shape.clone(), image_type.clone()),
        _ => return Err(FitsError::NotAnImage),
    };

    // Shape is slowest axis first: [.., NAXIS2, NAXIS1]
    if shape.len() < 2 {
        return Err(FitsError::TooFewAxes(shape.len()));
    }
    let width = shape[shape.len() - 1];
    let height = shape[shape.len() - 2];

    // Header values are untrusted; check the plane fits in the file before allocating
    let count = width
        .checked_mul(height)
        .ok_or(FitsError::TooLarge { width, height })?;
    let need = count
        .checked_mul(bytes_per_pixel(&image_type))
        .and_then(|n| u64::try_from(n).ok())
        .ok_or(FitsError::TooLarge { width, height })?;
    if need > file_len {
        return Err(FitsError::TruncatedData {
            need,
            have: file_len,
        });
    }

    let pixels: Vec<f32> = hdu.read_section(&mut fptr, 0, count)?;
    let have = pixels.len() as u64;
    Array2::from_shape_vec((height, width), pixels)
        .map_err(|_| FitsError::TruncatedData { need, have })
}
