//! Record collections and immutable snapshots of them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::medical::MedicalProfile;
use crate::resident::Resident;
use crate::station::StationAssignment;

/// The three base collections, in insertion order.
///
/// Serializes as the data document: `persons`, `fireStations`,
/// `medicalRecords`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(rename = "persons", default)]
    pub residents: Vec<Resident>,

    #[serde(rename = "fireStations", alias = "firestations", default)]
    pub stations: Vec<StationAssignment>,

    #[serde(rename = "medicalRecords", alias = "medicalrecords", default)]
    pub profiles: Vec<MedicalProfile>,
}

impl RecordSet {
    /// Total number of records across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.residents.len() + self.stations.len() + self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A consistent, read-only view of the store at one generation.
///
/// Cloning is cheap; the underlying collections are shared and never
/// modified after the snapshot is taken.
#[derive(Debug, Clone, Default)]
pub struct RecordSnapshot {
    generation: u64,
    records: Arc<RecordSet>,
}

impl RecordSnapshot {
    pub(crate) fn new(generation: u64, records: Arc<RecordSet>) -> Self {
        Self { generation, records }
    }

    /// Wraps a record set that is not backed by any store.
    #[must_use]
    pub fn detached(records: RecordSet) -> Self {
        Self::new(0, Arc::new(records))
    }

    /// Write counter of the store when this snapshot was taken.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn residents(&self) -> &[Resident] {
        &self.records.residents
    }

    #[must_use]
    pub fn stations(&self) -> &[StationAssignment] {
        &self.records.stations
    }

    #[must_use]
    pub fn profiles(&self) -> &[MedicalProfile] {
        &self.records.profiles
    }

    #[must_use]
    pub fn records(&self) -> &RecordSet {
        &self.records
    }
}
