//! IR validation.
//!
//! Deserialization already rejects non-positive station numbers and
//! malformed birthdates. This module checks the remaining field contracts
//! (blank names, zip, phone, e-mail, text bounds) before a request reaches
//! the store or the resolver.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::ir::operations::{AlertRequest, Operation};
use crate::medical::MedicalProfile;
use crate::resident::{PersonName, Resident};
use crate::station::StationAssignment;

/// Conservative upper bound for free-form text fields.
pub const MAX_TEXT_LEN: usize = 16 * 1024;

/// Upper bound for medication and allergy lists.
pub const MAX_LIST_LEN: usize = 256;

const ZIP_PATTERN: &str = r"^\d{5}$";
const PHONE_PATTERN: &str = r"^\d{3}-\d{3}-\d{4}$";
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Compile `source` once into `cell`, reporting a bad pattern as a
/// validation error on `field`.
fn compiled(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    field: &'static str,
    source: &str,
) -> Result<&'static Regex, ValidationError> {
    cell.get_or_init(|| Regex::new(source))
        .as_ref()
        .map_err(|e| ValidationError::InvalidPattern {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

fn zip_pattern() -> Result<&'static Regex, ValidationError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    compiled(&PATTERN, "zip", ZIP_PATTERN)
}

fn phone_pattern() -> Result<&'static Regex, ValidationError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    compiled(&PATTERN, "phone", PHONE_PATTERN)
}

fn email_pattern() -> Result<&'static Regex, ValidationError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    compiled(&PATTERN, "email", EMAIL_PATTERN)
}

/// Validate a non-empty trimmed string field.
fn validate_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ValidationError::MissingField {
            field: field.to_string(),
        });
    }
    if v.len() > MAX_TEXT_LEN {
        return Err(ValidationError::FieldTooLong {
            field: field.to_string(),
            max_length: MAX_TEXT_LEN,
        });
    }
    Ok(())
}

fn validate_pattern(
    field: &'static str,
    value: &str,
    pattern: Result<&Regex, ValidationError>,
    expected: &'static str,
) -> Result<(), ValidationError> {
    validate_non_empty(field, value)?;
    if !pattern?.is_match(value) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            value: value.to_string(),
            expected,
        });
    }
    Ok(())
}

fn validate_list(field: &'static str, items: &[String]) -> Result<(), ValidationError> {
    if items.len() > MAX_LIST_LEN {
        return Err(ValidationError::FieldTooLong {
            field: field.to_string(),
            max_length: MAX_LIST_LEN,
        });
    }
    for item in items {
        validate_non_empty(field, item)?;
    }
    Ok(())
}

impl PersonName {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("firstName", &self.first_name)?;
        validate_non_empty("lastName", &self.last_name)
    }
}

impl Resident {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("firstName", &self.first_name)?;
        validate_non_empty("lastName", &self.last_name)?;
        validate_non_empty("address", &self.address)?;
        validate_non_empty("city", &self.city)?;
        validate_pattern("zip", &self.zip, zip_pattern(), "five digits")?;
        validate_pattern("phone", &self.phone, phone_pattern(), "NNN-NNN-NNNN")?;
        validate_pattern("email", &self.email, email_pattern(), "an e-mail address")
    }
}

impl StationAssignment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("address", &self.address)
    }
}

impl MedicalProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("firstName", &self.first_name)?;
        validate_non_empty("lastName", &self.last_name)?;
        validate_list("medications", &self.medications)?;
        validate_list("allergies", &self.allergies)
    }
}

impl Operation {
    /// Validate the operation payload.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::CoverageByStation(_)
            | Self::PhoneNumbersByStation(_)
            | Self::DeleteStationsByNumber(_)
            | Self::ListResidents
            | Self::ListStations
            | Self::ListProfiles => Ok(()),
            Self::ChildrenAtAddress(q)
            | Self::ResidentsAndStationByAddress(q)
            | Self::DeleteStationByAddress(q) => validate_non_empty("address", &q.address),
            Self::EmailsByCity(q) => validate_non_empty("city", &q.city),
            Self::HouseholdsByStations(q) => {
                if q.stations.is_empty() {
                    return Err(ValidationError::EmptyStationList);
                }
                Ok(())
            }
            Self::PersonInfo(name) | Self::DeleteResident(name) | Self::DeleteProfile(name) => {
                name.validate()
            }
            Self::AddResident(r) | Self::UpdateResident(r) => r.validate(),
            Self::AddStation(s) | Self::UpdateStation(s) => s.validate(),
            Self::AddProfile(p) | Self::UpdateProfile(p) => p.validate(),
        }
    }
}

impl AlertRequest {
    /// Validate the full request envelope and payload.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("version", &self.version)?;
        self.operation.validate()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ir::operations::{AddressQuery, StationsQuery};
    use crate::station::StationNumber;

    fn resident() -> Resident {
        Resident {
            first_name: "John".to_string(),
            last_name: "Boyd".to_string(),
            address: "1509 Culver St".to_string(),
            city: "Culver".to_string(),
            zip: "97451".to_string(),
            phone: "841-874-6512".to_string(),
            email: "jaboyd@email.com".to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_resident() {
        assert!(Operation::AddResident(resident()).validate().is_ok());
    }

    #[test]
    fn rejects_blank_names() {
        let mut r = resident();
        r.first_name = "   ".to_string();
        let err = Operation::AddResident(r).validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "firstName".to_string()
            }
        );

        let err = Operation::PersonInfo(PersonName::new("John", "")).validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { field } if field == "lastName"));
    }

    #[test]
    fn rejects_malformed_contact_fields() {
        let mut r = resident();
        r.zip = "9745".to_string();
        assert!(matches!(
            r.validate(),
            Err(ValidationError::InvalidFormat { field, .. }) if field == "zip"
        ));

        let mut r = resident();
        r.phone = "8418746512".to_string();
        assert!(matches!(
            r.validate(),
            Err(ValidationError::InvalidFormat { field, .. }) if field == "phone"
        ));

        let mut r = resident();
        r.email = "not-an-email".to_string();
        assert!(matches!(
            r.validate(),
            Err(ValidationError::InvalidFormat { field, .. }) if field == "email"
        ));
    }

    #[test]
    fn rejects_blank_address_and_empty_station_list() {
        let op = Operation::ChildrenAtAddress(AddressQuery {
            address: String::new(),
        });
        assert!(op.validate().is_err());

        let op = Operation::HouseholdsByStations(StationsQuery { stations: vec![] });
        assert_eq!(op.validate().unwrap_err(), ValidationError::EmptyStationList);

        let op = Operation::AddStation(StationAssignment::new(" ", StationNumber::new(1).unwrap()));
        assert!(op.validate().is_err());
    }

    #[test]
    fn rejects_oversized_fields() {
        let mut r = resident();
        r.address = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(matches!(r.validate(), Err(ValidationError::FieldTooLong { .. })));

        let profile = MedicalProfile {
            first_name: "John".to_string(),
            last_name: "Boyd".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1984, 3, 6).unwrap(),
            medications: vec!["aznol:350mg".to_string(); MAX_LIST_LEN + 1],
            allergies: vec![],
        };
        assert!(matches!(profile.validate(), Err(ValidationError::FieldTooLong { .. })));
    }

    #[test]
    fn request_validation_checks_version() {
        let mut req = AlertRequest::new(Operation::ListResidents);
        assert!(req.validate().is_ok());
        req.version = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn contact_patterns_compile() {
        assert!(zip_pattern().unwrap().is_match("97451"));
        assert!(phone_pattern().unwrap().is_match("841-874-6512"));
        assert!(email_pattern().unwrap().is_match("jaboyd@email.com"));
    }

    #[test]
    fn bad_pattern_is_reported_not_skipped() {
        static BROKEN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
        let err = validate_pattern("zip", "97451", compiled(&BROKEN, "zip", r"(\d{5}"), "five digits")
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern { field, .. } if field == "zip"));
    }
}
