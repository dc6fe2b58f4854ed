//! Answer objects produced by the resolver.
//!
//! Views are derived per call and never stored. Field names serialize in
//! camelCase to match the record documents.

use serde::{Deserialize, Serialize};

use crate::medical::MedicalProfile;
use crate::resident::Resident;
use crate::station::StationLabel;

/// A resident reachable from a station, with derived age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveredResident {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: String,
    pub age: u32,
}

/// Residents covered by one station with adult/child counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    #[serde(rename = "persons")]
    pub residents: Vec<CoveredResident>,
    pub adult_count: usize,
    pub child_count: usize,
}

/// A child living at an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
}

/// An adult sharing the address with the children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    pub first_name: String,
    pub last_name: String,
}

/// Residents of one address partitioned into children and adults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildAlert {
    pub children: Vec<ChildRecord>,
    pub household_members: Vec<HouseholdMember>,
}

/// A resident joined with their medical profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentWithMedicalInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub age: u32,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
}

impl ResidentWithMedicalInfo {
    pub(crate) fn join(resident: &Resident, profile: &MedicalProfile, age: u32) -> Self {
        Self {
            first_name: resident.first_name.clone(),
            last_name: resident.last_name.clone(),
            phone: resident.phone.clone(),
            age,
            medications: profile.medications.clone(),
            allergies: profile.allergies.clone(),
        }
    }
}

/// Residents of one address with the station covering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressReport {
    pub address: String,
    pub station: StationLabel,
    pub residents: Vec<ResidentWithMedicalInfo>,
}

/// One household in a flood answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressGroup {
    pub address: String,
    pub residents: Vec<ResidentWithMedicalInfo>,
}

/// Contact and medical details for one named person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInfo {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub age: u32,
    pub email: String,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
}
