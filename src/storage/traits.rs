//! Abstract storage trait for AlertNet.
//!
//! Backends own the residents, station assignments and medical profiles.
//! By going through a trait, the engine can run against the in-memory
//! backend in tests and embedded use, or against any other implementation
//! that honours the same snapshot and serialization contract.

use thiserror::Error;

use crate::medical::MedicalProfile;
use crate::resident::{PersonName, Resident};
use crate::station::{StationAssignment, StationNumber};
use crate::storage::snapshot::{RecordSet, RecordSnapshot};

/// Errors that can occur during storage operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The address already has a station assignment.
    #[error("Address '{address}' is already assigned to station {station}")]
    AddressAlreadyAssigned {
        address: String,
        station: StationNumber,
    },

    /// A record with this identity key exists and uniqueness is enforced.
    #[error("A record named {0} already exists")]
    DuplicateIdentity(PersonName),

    /// No resident carries this name.
    #[error("Resident not found: {0}")]
    ResidentNotFound(PersonName),

    /// No medical profile carries this name.
    #[error("Medical profile not found: {0}")]
    ProfileNotFound(PersonName),

    /// The address has no station assignment.
    #[error("No station assignment for address '{0}'")]
    AddressNotFound(String),

    /// A writer panicked while holding the lock.
    #[error("Poisoned lock: {0}")]
    PoisonedLock(&'static str),
}

/// Storage contract for the three base collections.
///
/// # Consistency
/// - `snapshot` returns a view that later writes never alter
/// - Writes are serialized; two deletes never remove the same record twice
/// - Residents and profiles are addressed by exact (case-sensitive) name
pub trait RecordStore: Send + Sync {
    /// Consistent read-only view of all three collections.
    fn snapshot(&self) -> Result<RecordSnapshot, StorageError>;

    /// Replace every collection at once (initial load).
    fn replace_all(&self, records: RecordSet) -> Result<(), StorageError>;

    /// Append a resident.
    fn add_resident(&self, resident: Resident) -> Result<(), StorageError>;

    /// Update the contact attributes of the first resident with the same name.
    fn update_resident(&self, resident: Resident) -> Result<Resident, StorageError>;

    /// Remove every resident with this name. Returns how many were removed.
    fn delete_resident(&self, name: &PersonName) -> Result<usize, StorageError>;

    /// Assign an address to a station. Fails if the address is already assigned.
    fn add_station(&self, assignment: StationAssignment) -> Result<(), StorageError>;

    /// Replace the station number of an assigned address.
    fn update_station(&self, assignment: StationAssignment) -> Result<StationAssignment, StorageError>;

    /// Remove the assignment(s) of one address. Returns how many were removed.
    fn delete_station_by_address(&self, address: &str) -> Result<usize, StorageError>;

    /// Remove every assignment to a station. Returns how many were removed.
    fn delete_stations_by_number(&self, station: StationNumber) -> Result<usize, StorageError>;

    /// Append a medical profile.
    fn add_profile(&self, profile: MedicalProfile) -> Result<(), StorageError>;

    /// Update the first profile with the same name.
    fn update_profile(&self, profile: MedicalProfile) -> Result<MedicalProfile, StorageError>;

    /// Remove every profile with this name. Returns how many were removed.
    fn delete_profile(&self, name: &PersonName) -> Result<usize, StorageError>;
}
