//! Resident records and the `(firstName, lastName)` identity key.
//!
//! Residents carry no surrogate id. The name pair is the only link between a
//! resident and its medical profile, and nothing enforces its uniqueness
//! unless the store is configured to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How two names (or city strings) are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// Equality after Unicode lowercasing.
    IgnoreCase,
}

impl NameMatch {
    /// Compare two strings under this mode.
    #[must_use]
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            Self::Exact => a == b,
            Self::IgnoreCase => a == b || a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// Identity key shared by residents and medical profiles.
///
/// # Examples
///
/// ```
/// use alertnet::{NameMatch, PersonName};
///
/// let a = PersonName::new("John", "Boyd");
/// let b = PersonName::new("john", "BOYD");
/// assert!(!a.matches(&b, NameMatch::Exact));
/// assert!(a.matches(&b, NameMatch::IgnoreCase));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
}

impl PersonName {
    /// Creates a name key.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Compare both halves of the key under `mode`.
    #[must_use]
    pub fn matches(&self, other: &Self, mode: NameMatch) -> bool {
        self.matches_parts(&other.first_name, &other.last_name, mode)
    }

    /// Like [`PersonName::matches`] without building a second key.
    #[must_use]
    pub fn matches_parts(&self, first_name: &str, last_name: &str, mode: NameMatch) -> bool {
        mode.matches(&self.first_name, first_name) && mode.matches(&self.last_name, last_name)
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A person record with contact and address attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
}

impl Resident {
    /// Identity key of this resident.
    #[must_use]
    pub fn name(&self) -> PersonName {
        PersonName::new(self.first_name.clone(), self.last_name.clone())
    }

    /// True if this resident carries the given identity key.
    #[must_use]
    pub fn is_named(&self, name: &PersonName, mode: NameMatch) -> bool {
        name.matches_parts(&self.first_name, &self.last_name, mode)
    }

    /// Overwrite every non-identity attribute with `other`'s.
    pub fn apply_update(&mut self, other: Resident) {
        self.address = other.address;
        self.city = other.city;
        self.zip = other.zip;
        self.phone = other.phone;
        self.email = other.email;
    }
}
