use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::data::ImageRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("metadata store not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("metadata store {} is not a list of records: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("I/O error on metadata store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The MetadataStore is a JSON array of `ImageRecord`s kept in a single file.
///
/// Every append reads the whole list, pushes one record and writes the whole
/// list back. There is no locking: two writers on the same file race and the
/// last one to write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the store file (its identifier)
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load every record in insertion order
    pub fn load(&self) -> Result<Vec<ImageRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let records: Vec<ImageRecord> =
            serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Append one record and persist the full list
    ///
    /// A missing store starts out empty. Returns the store path unchanged.
    pub fn append(&self, record: ImageRecord) -> Result<&Path, StoreError> {
        let mut records = match self.load() {
            Ok(records) => records,
            Err(StoreError::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        records.push(record);
        self.write_all(&records)?;

        info!(
            "📁 Stored record #{} in {}",
            records.len(),
            self.path.display()
        );
        Ok(self.path.as_path())
    }

    /// Count records without keeping them around
    pub fn record_count(&self) -> Result<usize, StoreError> {
        Ok(self.load()?.len())
    }

    /// Replace the file contents with `records`
    fn write_all(&self, records: &[ImageRecord]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        // Ensure the parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string(records).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

/// Append `record` to the store at `store_id`, returning `store_id`
pub fn append(record: ImageRecord, store_id: &Path) -> Result<&Path, StoreError> {
    MetadataStore::new(store_id).append(record)?;
    Ok(store_id)
}

/// Load all records from the store at `store_id`
pub fn load(store_id: &Path) -> Result<Vec<ImageRecord>, StoreError> {
    MetadataStore::new(store_id).load()
}
