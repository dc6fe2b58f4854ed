//! JSON document persistence.
//!
//! The data document is a single JSON object with three arrays
//! (`persons`, `fireStations`, `medicalRecords`). Saving writes a sibling
//! temporary file and renames it over the target, so readers of the file
//! never see a half-written document.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::PersistenceError;
use crate::storage::snapshot::RecordSet;

/// Loads and saves the full record set.
pub trait Persistence: Send + Sync {
    /// Read the whole document.
    fn load(&self) -> Result<RecordSet, PersistenceError>;

    /// Replace the whole document with `records`.
    fn save(&self, records: &RecordSet) -> Result<(), PersistenceError>;
}

/// [`Persistence`] backed by one JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the data document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&self) -> Result<RecordSet, PersistenceError> {
        let bytes = fs::read(&self.path).map_err(|e| self.io_err(e))?;
        let records: RecordSet =
            serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Decode {
                path: self.path.clone(),
                source,
            })?;
        info!(
            path = %self.path.display(),
            residents = records.residents.len(),
            stations = records.stations.len(),
            profiles = records.profiles.len(),
            "loaded data document"
        );
        Ok(records)
    }

    fn save(&self, records: &RecordSet) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(records).map_err(PersistenceError::Encode)?;
        let tmp = self.temp_path();

        let mut file = fs::File::create(&tmp).map_err(|e| self.io_err(e))?;
        file.write_all(&bytes).map_err(|e| self.io_err(e))?;
        file.sync_all().map_err(|e| self.io_err(e))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "saved data document");
        Ok(())
    }
}
