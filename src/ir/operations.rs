//! AlertNet request and operation definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::medical::MedicalProfile;
use crate::resident::{PersonName, Resident};
use crate::station::{StationAssignment, StationNumber};

/// The envelope every request travels in.
///
/// Every operation is wrapped in this struct to provide:
/// - Protocol versioning for forward/backward compatibility
/// - Request tracking via unique IDs
/// - Timestamp for audit logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRequest {
    /// Protocol version (e.g., "1.0").
    pub version: String,

    /// Unique identifier for this request (for tracing/debugging).
    pub request_id: Uuid,

    /// When this request was created.
    pub timestamp: DateTime<Utc>,

    /// The operation to execute.
    pub operation: Operation,
}

impl AlertRequest {
    /// Current protocol version.
    pub const CURRENT_VERSION: &'static str = "1.0";

    /// Creates a new request with the given operation.
    pub fn new(operation: Operation) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            operation,
        }
    }

    /// Sets a custom request ID (useful for correlation).
    #[must_use]
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }
}

impl From<Operation> for AlertRequest {
    fn from(operation: Operation) -> Self {
        Self::new(operation)
    }
}

/// Payload naming one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationQuery {
    pub station: StationNumber,
}

/// Payload naming one street address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressQuery {
    pub address: String,
}

/// Payload naming a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityQuery {
    pub city: String,
}

/// Payload naming several stations.
///
/// `stations` accepts either a JSON array of numbers or a comma-separated
/// string such as `"1,2,3"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationsQuery {
    #[serde(deserialize_with = "station_list")]
    pub stations: Vec<StationNumber>,
}

fn station_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<StationNumber>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<StationNumber>),
        Csv(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::List(list) => Ok(list),
        Raw::Csv(csv) => StationNumber::parse_list(&csv).map_err(serde::de::Error::custom),
    }
}

/// All supported AlertNet operations.
///
/// Queries never modify the store; every other variant is a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum Operation {
    /// Residents covered by a station, with adult/child counts.
    CoverageByStation(StationQuery),
    /// Children (and the adults they live with) at an address.
    ChildrenAtAddress(AddressQuery),
    /// Distinct phone numbers of everyone a station covers.
    PhoneNumbersByStation(StationQuery),
    /// Residents of an address with medical details and covering station.
    ResidentsAndStationByAddress(AddressQuery),
    /// Distinct e-mails of a city's residents.
    EmailsByCity(CityQuery),
    /// Households covered by a set of stations, grouped by address.
    HouseholdsByStations(StationsQuery),
    /// Contact and medical details for one person.
    PersonInfo(PersonName),

    AddResident(Resident),
    UpdateResident(Resident),
    DeleteResident(PersonName),

    AddStation(StationAssignment),
    UpdateStation(StationAssignment),
    DeleteStationByAddress(AddressQuery),
    DeleteStationsByNumber(StationQuery),

    AddProfile(MedicalProfile),
    UpdateProfile(MedicalProfile),
    DeleteProfile(PersonName),

    ListResidents,
    ListStations,
    ListProfiles,
}

impl Operation {
    /// Stable snake_case name, as used in the `op` tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CoverageByStation(_) => "coverage_by_station",
            Self::ChildrenAtAddress(_) => "children_at_address",
            Self::PhoneNumbersByStation(_) => "phone_numbers_by_station",
            Self::ResidentsAndStationByAddress(_) => "residents_and_station_by_address",
            Self::EmailsByCity(_) => "emails_by_city",
            Self::HouseholdsByStations(_) => "households_by_stations",
            Self::PersonInfo(_) => "person_info",
            Self::AddResident(_) => "add_resident",
            Self::UpdateResident(_) => "update_resident",
            Self::DeleteResident(_) => "delete_resident",
            Self::AddStation(_) => "add_station",
            Self::UpdateStation(_) => "update_station",
            Self::DeleteStationByAddress(_) => "delete_station_by_address",
            Self::DeleteStationsByNumber(_) => "delete_stations_by_number",
            Self::AddProfile(_) => "add_profile",
            Self::UpdateProfile(_) => "update_profile",
            Self::DeleteProfile(_) => "delete_profile",
            Self::ListResidents => "list_residents",
            Self::ListStations => "list_stations",
            Self::ListProfiles => "list_profiles",
        }
    }

    /// True if executing this operation changes the store.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::AddResident(_)
                | Self::UpdateResident(_)
                | Self::DeleteResident(_)
                | Self::AddStation(_)
                | Self::UpdateStation(_)
                | Self::DeleteStationByAddress(_)
                | Self::DeleteStationsByNumber(_)
                | Self::AddProfile(_)
                | Self::UpdateProfile(_)
                | Self::DeleteProfile(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(n: u32) -> StationNumber {
        StationNumber::new(n).unwrap()
    }

    #[test]
    fn test_request_creation() {
        let req = AlertRequest::new(Operation::ListStations);
        assert_eq!(req.version, AlertRequest::CURRENT_VERSION);
        assert!(!req.request_id.is_nil());

        let id = Uuid::new_v4();
        assert_eq!(req.with_request_id(id).request_id, id);
    }

    #[test]
    fn test_operation_tagging() {
        let op = Operation::CoverageByStation(StationQuery { station: station(3) });
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "coverage_by_station");
        assert_eq!(json["payload"]["station"], 3);
        assert_eq!(op.name(), "coverage_by_station");

        let json = serde_json::to_value(Operation::ListResidents).unwrap();
        assert_eq!(json["op"], "list_residents");
        let back: Operation = serde_json::from_str(r#"{"op":"list_residents"}"#).unwrap();
        assert_eq!(back, Operation::ListResidents);
    }

    #[test]
    fn test_person_info_payload_is_camel_case() {
        let op: Operation = serde_json::from_str(
            r#"{"op":"person_info","payload":{"firstName":"john","lastName":"BOYD"}}"#,
        )
        .unwrap();
        assert_eq!(op, Operation::PersonInfo(PersonName::new("john", "BOYD")));
    }

    #[test]
    fn test_station_list_accepts_array_or_csv() {
        let a: StationsQuery = serde_json::from_str(r#"{"stations":[1,2]}"#).unwrap();
        let b: StationsQuery = serde_json::from_str(r#"{"stations":"1, 2"}"#).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<StationsQuery>(r#"{"stations":"1,x"}"#).is_err());
        assert!(serde_json::from_str::<StationsQuery>(r#"{"stations":[0]}"#).is_err());
    }

    #[test]
    fn test_mutation_classification() {
        assert!(Operation::DeleteStationsByNumber(StationQuery { station: station(1) }).is_mutation());
        assert!(!Operation::EmailsByCity(CityQuery { city: "Culver".to_string() }).is_mutation());
        assert!(!Operation::ListProfiles.is_mutation());
    }
}
