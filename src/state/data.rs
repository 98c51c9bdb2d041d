/// Shared data structures for the metadata store
///
/// These structs represent the records that flow between
/// the image sources, the JSON store and the scene assembler.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Reasons an `ImageRecord` can be rejected at construction time
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("right ascension {0} is outside [0, 360)")]
    RaOutOfRange(f64),
    #[error("declination {0} is outside [-90, 90]")]
    DecOutOfRange(f64),
    #[error("artifact file name is empty")]
    EmptyFile,
}

/// One fetched image in the metadata store
///
/// Field names are part of the on-disk format and must stay `ra`, `dec`, `file`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawRecord")]
pub struct ImageRecord {
    /// Right ascension in degrees, [0, 360)
    ra: f64,
    /// Declination in degrees, [-90, 90]
    dec: f64,
    /// Path of the artifact produced by the fetch
    file: String,
}

/// Unvalidated shape of a record as it appears in JSON
#[derive(Deserialize)]
struct RawRecord {
    ra: f64,
    dec: f64,
    file: String,
}

impl TryFrom<RawRecord> for ImageRecord {
    type Error = RecordError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        ImageRecord::new(raw.ra, raw.dec, raw.file)
    }
}

impl ImageRecord {
    /// Create a validated record
    ///
    /// NaN fails both range checks, so non-finite input is rejected too.
    pub fn new(ra: f64, dec: f64, file: impl Into<String>) -> Result<Self, RecordError> {
        if !(0.0..360.0).contains(&ra) {
            return Err(RecordError::RaOutOfRange(ra));
        }
        if !(-90.0..=90.0).contains(&dec) {
            return Err(RecordError::DecOutOfRange(dec));
        }
        let file = file.into();
        if file.trim().is_empty() {
            return Err(RecordError::EmptyFile);
        }
        Ok(Self { ra, dec, file })
    }

    pub fn ra(&self) -> f64 {
        self.ra
    }

    pub fn dec(&self) -> f64 {
        self.dec
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn file_path(&self) -> &Path {
        Path::new(&self.file)
    }
}
