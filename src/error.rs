//! Error types for AlertNet.
//!
//! All errors are strongly typed using thiserror, so callers can match on
//! the specific condition (unknown station, missing profile, conflicting
//! assignment) and the transport side can map each one to a status.

use std::path::PathBuf;

use thiserror::Error;

use crate::resident::PersonName;
use crate::station::StationNumber;
use crate::storage::StorageError;

/// Validation errors raised for malformed request parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing or blank")]
    MissingField {
        field: String,
    },

    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        field: String,
        max_length: usize,
    },

    #[error("Field '{field}' has invalid value '{value}', expected {expected}")]
    InvalidFormat {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("Station number must be a positive integer, got '{value}'")]
    InvalidStationNumber {
        value: String,
    },

    #[error("Station list cannot be empty")]
    EmptyStationList,

    #[error("Pattern for field '{field}' failed to compile: {reason}")]
    InvalidPattern {
        field: String,
        reason: String,
    },
}

/// Errors raised while resolving a query or applying a request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Station not found: {station}")]
    StationNotFound {
        station: StationNumber,
    },

    #[error("Stations not found: {}", join_stations(.stations))]
    StationsNotFound {
        stations: Vec<StationNumber>,
    },

    #[error("Medical profile not found for {name} (required by {operation})")]
    MedicalProfileMissing {
        name: PersonName,
        operation: &'static str,
    },

    #[error("Nothing to remove: {target}")]
    NothingRemoved {
        target: String,
    },
}

fn join_stations(stations: &[StationNumber]) -> String {
    stations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid data document {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode data document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// User-facing status an error translates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl Status {
    /// HTTP-style numeric code for this status.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }
}

/// Top-level error type for AlertNet.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl AlertError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Status a transport layer should report for this error.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::Execution(_) => Status::NotFound,
            Self::Storage(e) => match e {
                StorageError::AddressAlreadyAssigned { .. } | StorageError::DuplicateIdentity(_) => {
                    Status::Conflict
                }
                StorageError::ResidentNotFound(_)
                | StorageError::ProfileNotFound(_)
                | StorageError::AddressNotFound(_) => Status::NotFound,
                StorageError::PoisonedLock(_) => Status::Internal,
            },
            Self::Persistence(_) | Self::Internal { .. } => Status::Internal,
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if a required record was missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Status::NotFound)
    }

    /// Returns true if the request collided with existing data.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.status(), Status::Conflict)
    }
}

/// Result type alias for AlertNet operations.
pub type AlertResult<T> = Result<T, AlertError>;
