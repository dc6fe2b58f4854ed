//! Medical profiles: birthdate, medications and allergies for a name key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::resident::{NameMatch, PersonName};

/// Wire format for birthdates (`MM/dd/yyyy`).
pub const BIRTHDATE_FORMAT: &str = "%m/%d/%Y";

/// Parse a `MM/dd/yyyy` birthdate.
pub fn parse_birthdate(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), BIRTHDATE_FORMAT).ok()
}

mod birthdate {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::BIRTHDATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(BIRTHDATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_birthdate(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid birthdate '{raw}', expected MM/dd/yyyy"))
        })
    }
}

/// Medical data keyed by `(firstName, lastName)`.
///
/// Profiles are independent of residents: one may exist without the other.
/// Medication entries are free text, conventionally `name:dosage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalProfile {
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "birthdate")]
    pub birthdate: NaiveDate,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl MedicalProfile {
    /// Identity key of this profile.
    #[must_use]
    pub fn name(&self) -> PersonName {
        PersonName::new(self.first_name.clone(), self.last_name.clone())
    }

    #[must_use]
    pub fn is_named(&self, name: &PersonName, mode: NameMatch) -> bool {
        name.matches_parts(&self.first_name, &self.last_name, mode)
    }

    /// Overwrite birthdate, medications and allergies with `other`'s.
    pub fn apply_update(&mut self, other: MedicalProfile) {
        self.birthdate = other.birthdate;
        self.medications = other.medications;
        self.allergies = other.allergies;
    }
}
