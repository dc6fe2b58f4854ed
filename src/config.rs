//! Service configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AlertError, AlertResult, PersistenceError, ValidationError};
use crate::resolve::ResolverConfig;

/// Record store policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Reject a second resident or profile with an existing name.
    pub unique_identity: bool,
}

/// Top-level configuration for an AlertNet service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Data document loaded at start-up. With `save_on_mutation` it may
    /// not exist yet; the first mutation creates it.
    pub data_file: Option<PathBuf>,
    /// Write the data document back after each successful mutation.
    pub save_on_mutation: bool,
    pub store: StoreConfig,
    pub resolver: ResolverConfig,
}

impl ServiceConfig {
    /// Read a JSON config file.
    pub fn from_json_file(path: &Path) -> AlertResult<Self> {
        let bytes = fs::read(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()
    }

    /// Check cross-field constraints.
    pub fn validate(self) -> AlertResult<Self> {
        if self.save_on_mutation && self.data_file.is_none() {
            return Err(AlertError::Validation(ValidationError::MissingField {
                field: "data_file (required when save_on_mutation is set)".to_string(),
            }));
        }
        Ok(self)
    }
}
