use serde::{Deserialize, Serialize};

use crate::resident::NameMatch;

/// What a profile-joining operation does with a resident that has no
/// medical profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingProfilePolicy {
    /// Abort the query with `MedicalProfileMissing`.
    Fail,
    /// Leave the resident out of the answer and log it.
    Skip,
}

/// Per-operation join behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPolicy {
    pub missing_profile: MissingProfilePolicy,
    /// How resident names are matched against profile names (and, for
    /// person lookups, against the requested name).
    pub name_match: NameMatch,
}

impl OperationPolicy {
    #[must_use]
    pub const fn new(missing_profile: MissingProfilePolicy, name_match: NameMatch) -> Self {
        Self {
            missing_profile,
            name_match,
        }
    }

    const fn strict() -> Self {
        Self::new(MissingProfilePolicy::Fail, NameMatch::Exact)
    }
}

/// Resolver configuration.
///
/// The defaults reproduce the established behaviour, including its
/// inconsistencies: the child alert skips residents without a profile
/// while the other joins fail, and only person lookups ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Oldest age (inclusive) still counted as a child.
    pub child_age_limit: u32,
    /// City comparison for community e-mail lookups.
    pub city_match: NameMatch,
    pub coverage: OperationPolicy,
    pub children_at_address: OperationPolicy,
    pub residents_at_address: OperationPolicy,
    pub households: OperationPolicy,
    pub person_info: OperationPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            child_age_limit: 18,
            city_match: NameMatch::IgnoreCase,
            coverage: OperationPolicy::strict(),
            children_at_address: OperationPolicy::new(MissingProfilePolicy::Skip, NameMatch::Exact),
            residents_at_address: OperationPolicy::strict(),
            households: OperationPolicy::strict(),
            person_info: OperationPolicy::new(MissingProfilePolicy::Fail, NameMatch::IgnoreCase),
        }
    }
}

impl ResolverConfig {
    /// True if `age` classifies as a child.
    #[must_use]
    pub const fn is_child(&self, age: u32) -> bool {
        age <= self.child_age_limit
    }
}
