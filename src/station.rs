//! Fire-station numbers and address assignments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A positive fire-station number.
///
/// # Examples
///
/// ```
/// use alertnet::StationNumber;
///
/// let stations = StationNumber::parse_list("1, 2,3").unwrap();
/// assert_eq!(stations.len(), 3);
/// assert!(StationNumber::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct StationNumber(u32);

impl StationNumber {
    /// Creates a station number, rejecting zero.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::InvalidStationNumber {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Returns the raw number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Parse a comma-separated station list such as `"1,2,3"`.
    ///
    /// Order is kept and repeated numbers are kept; callers that need a set
    /// deduplicate themselves.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, ValidationError> {
        if list.trim().is_empty() {
            return Err(ValidationError::EmptyStationList);
        }
        list.split(',').map(str::parse).collect()
    }
}

impl FromStr for StationNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = trimmed
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidStationNumber {
                value: trimmed.to_string(),
            })?;
        Self::new(value)
    }
}

impl TryFrom<u32> for StationNumber {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StationNumber> for u32 {
    fn from(n: StationNumber) -> Self {
        n.0
    }
}

impl fmt::Display for StationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serde adapter for station numbers stored as string numerals (`"3"`).
pub(crate) mod numeral {
    use super::{Deserialize, Deserializer, Serializer, StationNumber};

    pub fn serialize<S: Serializer>(station: &StationNumber, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(station)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StationNumber, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u32),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Number(n) => StationNumber::new(n).map_err(serde::de::Error::custom),
        }
    }
}

/// Maps one street address to the station covering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationAssignment {
    pub address: String,
    #[serde(with = "numeral")]
    pub station: StationNumber,
}

impl StationAssignment {
    pub fn new(address: impl Into<String>, station: StationNumber) -> Self {
        Self {
            address: address.into(),
            station,
        }
    }
}

/// Station covering an address, or the `"Unknown"` sentinel when the address
/// has no assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationLabel {
    Assigned(StationNumber),
    Unknown,
}

impl StationLabel {
    pub const UNKNOWN: &'static str = "Unknown";
}

impl From<Option<StationNumber>> for StationLabel {
    fn from(station: Option<StationNumber>) -> Self {
        station.map_or(Self::Unknown, Self::Assigned)
    }
}

impl fmt::Display for StationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str(Self::UNKNOWN),
        }
    }
}

impl Serialize for StationLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StationLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == Self::UNKNOWN {
            return Ok(Self::Unknown);
        }
        raw.parse().map(Self::Assigned).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_rejects_blank_and_zero() {
        assert_eq!(StationNumber::parse_list(" "), Err(ValidationError::EmptyStationList));
        assert!(StationNumber::parse_list("1,,2").is_err());
        assert!(StationNumber::parse_list("1,0").is_err());
        assert!(StationNumber::parse_list("1,-2").is_err());

        let parsed = StationNumber::parse_list("3,1,3").unwrap();
        let raw: Vec<u32> = parsed.into_iter().map(u32::from).collect();
        assert_eq!(raw, vec![3, 1, 3]);
    }

    #[test]
    fn assignment_station_is_a_string_numeral() {
        let a = StationAssignment::new("1509 Culver St", StationNumber::new(3).unwrap());
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["station"], "3");

        let back: StationAssignment =
            serde_json::from_str(r#"{"address":"1509 Culver St","station":"3"}"#).unwrap();
        assert_eq!(back, a);

        let numeric: StationAssignment =
            serde_json::from_str(r#"{"address":"1509 Culver St","station":3}"#).unwrap();
        assert_eq!(numeric, a);

        assert!(serde_json::from_str::<StationAssignment>(r#"{"address":"x","station":"0"}"#).is_err());
    }

    #[test]
    fn station_number_rejects_zero_on_deserialize() {
        assert!(serde_json::from_str::<StationNumber>("0").is_err());
        assert_eq!(serde_json::from_str::<StationNumber>("4").unwrap().get(), 4);
    }

    #[test]
    fn label_uses_unknown_sentinel() {
        let label = StationLabel::from(None);
        assert_eq!(serde_json::to_value(label).unwrap(), "Unknown");
        let label = StationLabel::from(Some(StationNumber::new(2).unwrap()));
        assert_eq!(serde_json::to_value(label).unwrap(), "2");
        let back: StationLabel = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(back, StationLabel::Unknown);
    }
}
