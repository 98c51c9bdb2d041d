//! Fetch a list of coordinates and record every success.

use std::path::PathBuf;
use tracing::{info, warn};

use super::ImageSource;
use crate::state::data::ImageRecord;
use crate::state::store::{MetadataStore, StoreError};

/// Why one coordinate produced no record
#[derive(Debug)]
pub struct BatchFailure {
    pub ra: f64,
    pub dec: f64,
    pub reason: String,
}

/// Outcome of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub stored: Vec<ImageRecord>,
    pub failed: Vec<BatchFailure>,
}

/// Fetch each coordinate and append a record for every artifact produced
///
/// A failed fetch (or an invalid coordinate) is logged and skipped. A store
/// error stops the batch, since later appends would hit the same problem.
pub fn fetch_and_store(
    source: &dyn ImageSource,
    coords: &[(f64, f64)],
    store: &MetadataStore,
) -> Result<BatchReport, StoreError> {
    let mut report = BatchReport::default();

    for &(ra, dec) in coords {
        let fail = |reason: String| {
            warn!("⚠️  No image for ({}, {}) via {}: {}", ra, dec, source.name(), reason);
            BatchFailure { ra, dec, reason }
        };

        // Reject bad coordinates before spending a request on them
        if let Err(e) = ImageRecord::new(ra, dec, "-") {
            report.failed.push(fail(e.to_string()));
            continue;
        }

        let path: PathBuf = match source.fetch(ra, dec) {
            Ok(path) => path,
            Err(e) => {
                report.failed.push(fail(e.to_string()));
                continue;
            }
        };

        let record = match ImageRecord::new(ra, dec, path.to_string_lossy()) {
            Ok(record) => record,
            Err(e) => {
                report.failed.push(fail(e.to_string()));
                continue;
            }
        };
        store.append(record.clone())?;
        report.stored.push(record);
    }

    info!(
        "✅ Batch complete: {} stored, {} failed ({})",
        report.stored.len(),
        report.failed.len(),
        store.path().display()
    );
    Ok(report)
}
