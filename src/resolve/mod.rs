//! Relational resolution over residents, station assignments and medical
//! profiles.
//!
//! The [`Resolver`] holds configuration and a clock, nothing else. Every
//! operation takes a [`RecordSnapshot`], builds [`Indices`] over it, reads
//! "today" from the clock once, and returns a freshly built view. It never
//! mutates the store.
//!
//! # Missing profiles
//!
//! Ages and medical details come from the profile joined by name. What
//! happens when a resident has no profile is decided per operation by
//! [`OperationPolicy::missing_profile`]; see [`ResolverConfig`] for the
//! defaults.

mod policies;
mod views;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::ExecutionError;
use crate::index::Indices;
use crate::medical::MedicalProfile;
use crate::resident::Resident;
use crate::station::{StationLabel, StationNumber};
use crate::storage::RecordSnapshot;
use crate::time::{age_on, Clock, SystemClock};

pub use policies::{MissingProfilePolicy, OperationPolicy, ResolverConfig};
pub use views::{
    AddressGroup, AddressReport, ChildAlert, ChildRecord, CoverageSummary, CoveredResident,
    HouseholdMember, PersonInfo, ResidentWithMedicalInfo,
};

const COVERAGE: &str = "coverage_by_station";
const CHILDREN: &str = "children_at_address";
const RESIDENTS_AT: &str = "residents_and_station_by_address";
const HOUSEHOLDS: &str = "households_by_stations";
const PERSON_INFO: &str = "person_info";

/// Stateless query engine over record snapshots.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: ResolverConfig,
    clock: Arc<dyn Clock>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default(), Arc::new(SystemClock))
    }
}

impl Resolver {
    /// Create a resolver computing ages against `clock`.
    #[must_use]
    pub fn new(config: ResolverConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The reference date the next query will use.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Join `resident` to its profile under `policy`.
    ///
    /// `Ok(None)` means the resident is to be skipped.
    fn join<'a>(
        indices: &Indices<'a>,
        resident: &Resident,
        policy: OperationPolicy,
        operation: &'static str,
    ) -> Result<Option<&'a MedicalProfile>, ExecutionError> {
        if let Some(profile) = indices.profile_of(resident, policy.name_match) {
            return Ok(Some(profile));
        }
        match policy.missing_profile {
            MissingProfilePolicy::Fail => Err(ExecutionError::MedicalProfileMissing {
                name: resident.name(),
                operation,
            }),
            MissingProfilePolicy::Skip => {
                warn!(
                    resident = %resident.name(),
                    operation,
                    "no medical profile, leaving resident out"
                );
                Ok(None)
            }
        }
    }

    /// Residents reachable from `station` with adult and child counts.
    ///
    /// # Errors
    /// - `StationNotFound` if no address is assigned to `station`
    /// - `MedicalProfileMissing` for a covered resident without a profile
    ///   (unless the coverage policy skips)
    pub fn coverage_by_station(
        &self,
        snapshot: &RecordSnapshot,
        station: StationNumber,
    ) -> Result<CoverageSummary, ExecutionError> {
        let indices = Indices::build(snapshot);
        let today = self.today();
        let addresses = indices
            .addresses_for(station)
            .ok_or(ExecutionError::StationNotFound { station })?;

        let mut summary = CoverageSummary::default();
        for address in addresses {
            for resident in indices.residents_at(address) {
                let Some(profile) = Self::join(&indices, resident, self.config.coverage, COVERAGE)? else {
                    continue;
                };
                let age = age_on(profile.birthdate, today);
                if self.config.is_child(age) {
                    summary.child_count += 1;
                } else {
                    summary.adult_count += 1;
                }
                summary.residents.push(CoveredResident {
                    first_name: resident.first_name.clone(),
                    last_name: resident.last_name.clone(),
                    address: resident.address.clone(),
                    phone: resident.phone.clone(),
                    age,
                });
            }
        }

        debug!(
            %station,
            residents = summary.residents.len(),
            adults = summary.adult_count,
            children = summary.child_count,
            "resolved station coverage"
        );
        Ok(summary)
    }

    /// Children at `address`, plus the adults they live with.
    ///
    /// An address without residents yields two empty lists. Residents
    /// without a profile are skipped by default.
    pub fn children_at_address(
        &self,
        snapshot: &RecordSnapshot,
        address: &str,
    ) -> Result<ChildAlert, ExecutionError> {
        let indices = Indices::build(snapshot);
        let today = self.today();

        let mut alert = ChildAlert::default();
        for resident in indices.residents_at(address) {
            let policy = self.config.children_at_address;
            let Some(profile) = Self::join(&indices, resident, policy, CHILDREN)? else {
                continue;
            };
            let age = age_on(profile.birthdate, today);
            if self.config.is_child(age) {
                alert.children.push(ChildRecord {
                    first_name: resident.first_name.clone(),
                    last_name: resident.last_name.clone(),
                    age,
                });
            } else {
                alert.household_members.push(HouseholdMember {
                    first_name: resident.first_name.clone(),
                    last_name: resident.last_name.clone(),
                });
            }
        }
        Ok(alert)
    }

    /// Distinct phone numbers of everyone covered by `station`, first-seen
    /// order. An unknown station yields an empty list.
    #[must_use]
    pub fn phone_numbers_by_station(&self, snapshot: &RecordSnapshot, station: StationNumber) -> Vec<String> {
        let indices = Indices::build(snapshot);
        let Some(addresses) = indices.addresses_for(station) else {
            debug!(%station, "no addresses for station, no phone numbers");
            return Vec::new();
        };

        let mut seen: HashSet<&str> = HashSet::new();
        let mut phones = Vec::new();
        for address in addresses {
            for resident in indices.residents_at(address) {
                if seen.insert(resident.phone.as_str()) {
                    phones.push(resident.phone.clone());
                }
            }
        }
        phones
    }

    /// Residents of `address` with medical details, and the covering station
    /// (`"Unknown"` if the address is unassigned).
    ///
    /// # Errors
    /// - `MedicalProfileMissing` for a resident without a profile (default policy)
    pub fn residents_and_station_by_address(
        &self,
        snapshot: &RecordSnapshot,
        address: &str,
    ) -> Result<AddressReport, ExecutionError> {
        let indices = Indices::build(snapshot);
        let today = self.today();
        let residents =
            self.with_medical_info(&indices, address, today, self.config.residents_at_address, RESIDENTS_AT)?;
        Ok(AddressReport {
            address: address.to_string(),
            station: StationLabel::from(indices.station_for(address)),
            residents,
        })
    }

    /// Distinct e-mails of residents of `city`, first-seen order.
    ///
    /// City matching follows [`ResolverConfig::city_match`] (case-insensitive
    /// by default); e-mails are compared exactly.
    #[must_use]
    pub fn emails_by_city(&self, snapshot: &RecordSnapshot, city: &str) -> Vec<String> {
        let mode = self.config.city_match;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut emails = Vec::new();
        for resident in snapshot.residents() {
            if mode.matches(&resident.city, city) && seen.insert(resident.email.as_str()) {
                emails.push(resident.email.clone());
            }
        }
        emails
    }

    /// Households covered by any of `stations`, grouped by address.
    ///
    /// Stations are visited in input order (repeats ignored), addresses in
    /// assignment order. Addresses without residents produce no group.
    ///
    /// # Errors
    /// - `StationsNotFound` naming every unknown station, checked before any
    ///   join
    /// - `MedicalProfileMissing` for a resident without a profile (default policy)
    pub fn households_by_stations(
        &self,
        snapshot: &RecordSnapshot,
        stations: &[StationNumber],
    ) -> Result<Vec<AddressGroup>, ExecutionError> {
        let indices = Indices::build(snapshot);
        let today = self.today();

        let mut requested: Vec<StationNumber> = Vec::with_capacity(stations.len());
        for station in stations {
            if !requested.contains(station) {
                requested.push(*station);
            }
        }

        let unknown: Vec<StationNumber> = requested
            .iter()
            .copied()
            .filter(|s| indices.addresses_for(*s).is_none())
            .collect();
        if !unknown.is_empty() {
            return Err(ExecutionError::StationsNotFound { stations: unknown });
        }

        let mut groups = Vec::new();
        for station in requested {
            for address in indices.addresses_for(station).unwrap_or_default() {
                let residents =
                    self.with_medical_info(&indices, address, today, self.config.households, HOUSEHOLDS)?;
                if residents.is_empty() {
                    continue;
                }
                groups.push(AddressGroup {
                    address: (*address).to_string(),
                    residents,
                });
            }
        }
        Ok(groups)
    }

    /// Contact and medical details of the first resident with this name.
    ///
    /// Returns `Ok(None)` when no resident matches.
    ///
    /// # Errors
    /// - `MedicalProfileMissing` if the resident exists but has no profile
    pub fn person_info(
        &self,
        snapshot: &RecordSnapshot,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<PersonInfo>, ExecutionError> {
        let indices = Indices::build(snapshot);
        let policy = self.config.person_info;
        let Some(resident) = indices.find_resident(first_name, last_name, policy.name_match) else {
            debug!(first_name, last_name, "no resident with this name");
            return Ok(None);
        };
        let Some(profile) = Self::join(&indices, resident, policy, PERSON_INFO)? else {
            return Ok(None);
        };

        Ok(Some(PersonInfo {
            first_name: resident.first_name.clone(),
            last_name: resident.last_name.clone(),
            address: resident.address.clone(),
            age: age_on(profile.birthdate, self.today()),
            email: resident.email.clone(),
            medications: profile.medications.clone(),
            allergies: profile.allergies.clone(),
        }))
    }

    fn with_medical_info(
        &self,
        indices: &Indices<'_>,
        address: &str,
        today: NaiveDate,
        policy: OperationPolicy,
        operation: &'static str,
    ) -> Result<Vec<ResidentWithMedicalInfo>, ExecutionError> {
        let mut out = Vec::new();
        for resident in indices.residents_at(address) {
            if let Some(profile) = Self::join(indices, resident, policy, operation)? {
                out.push(ResidentWithMedicalInfo::join(
                    resident,
                    profile,
                    age_on(profile.birthdate, today),
                ));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resident::{NameMatch, PersonName};
    use crate::station::StationAssignment;
    use crate::storage::RecordSet;
    use crate::time::FixedClock;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn resolver() -> Resolver {
        Resolver::new(ResolverConfig::default(), Arc::new(FixedClock(today())))
    }

    fn station(n: u32) -> StationNumber {
        StationNumber::new(n).unwrap()
    }

    fn resident(first: &str, last: &str, address: &str, city: &str, phone: &str, email: &str) -> Resident {
        Resident {
            first_name: first.to_string(),
            last_name: last.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            zip: "97451".to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        }
    }

    fn profile(first: &str, last: &str, birthdate: NaiveDate) -> MedicalProfile {
        MedicalProfile {
            first_name: first.to_string(),
            last_name: last.to_string(),
            birthdate,
            medications: vec![format!("{}-med:10mg", first.to_lowercase())],
            allergies: vec![],
        }
    }

    fn years_ago(years: i32, days_offset: i64) -> NaiveDate {
        let t = today();
        NaiveDate::from_ymd_opt(chrono::Datelike::year(&t) - years, 6, 1).unwrap()
            + chrono::Duration::days(days_offset)
    }

    fn fixture() -> RecordSnapshot {
        RecordSnapshot::detached(RecordSet {
            residents: vec![
                resident("John", "Boyd", "1509 Culver St", "Culver", "841-874-6512", "jaboyd@email.com"),
                resident("Tenley", "Boyd", "1509 Culver St", "Culver", "841-874-6512", "tenz@email.com"),
                resident("Roger", "Boyd", "1509 Culver St", "Culver", "841-874-6512", "jaboyd@email.com"),
                resident("Peter", "Duncan", "644 Gershwin Cir", "Culver", "841-874-6544", "jaboyd@email.com"),
                resident("Lily", "Cooper", "489 Manchester St", "Lyon", "841-874-9845", "lily@email.com"),
                resident("Ghost", "Resident", "29 15th St", "Culver", "841-874-0000", "ghost@email.com"),
            ],
            stations: vec![
                StationAssignment::new("1509 Culver St", station(3)),
                StationAssignment::new("644 Gershwin Cir", station(1)),
                StationAssignment::new("489 Manchester St", station(4)),
                StationAssignment::new("29 15th St", station(2)),
                StationAssignment::new("908 73rd St", station(1)),
            ],
            profiles: vec![
                profile("John", "Boyd", years_ago(40, 0)),
                profile("Tenley", "Boyd", years_ago(12, 0)),
                // Turns 19 tomorrow: still 18, still a child.
                profile("Roger", "Boyd", years_ago(19, 1)),
                profile("Peter", "Duncan", years_ago(19, 0)),
                profile("Lily", "Cooper", years_ago(30, 0)),
            ],
        })
    }

    #[test]
    fn coverage_counts_adults_and_children() {
        let snap = fixture();
        let summary = resolver().coverage_by_station(&snap, station(3)).unwrap();
        assert_eq!(summary.residents.len(), 3);
        assert_eq!(summary.child_count, 2);
        assert_eq!(summary.adult_count, 1);
        assert_eq!(summary.adult_count + summary.child_count, summary.residents.len());
        let roger = summary.residents.iter().find(|r| r.first_name == "Roger").unwrap();
        assert_eq!(roger.age, 18);
    }

    #[test]
    fn coverage_unknown_station_is_an_error() {
        let snap = fixture();
        let err = resolver().coverage_by_station(&snap, station(42)).unwrap_err();
        assert_eq!(err, ExecutionError::StationNotFound { station: station(42) });
    }

    #[test]
    fn coverage_fails_on_missing_profile_by_default() {
        let snap = fixture();
        let err = resolver().coverage_by_station(&snap, station(2)).unwrap_err();
        assert!(matches!(err, ExecutionError::MedicalProfileMissing { operation: COVERAGE, .. }));
    }

    #[test]
    fn children_partition_and_skip_missing_profiles() {
        let snap = fixture();
        let alert = resolver().children_at_address(&snap, "1509 Culver St").unwrap();
        let kids: Vec<&str> = alert.children.iter().map(|c| c.first_name.as_str()).collect();
        assert_eq!(kids, vec!["Tenley", "Roger"]);
        assert_eq!(alert.household_members.len(), 1);
        assert_eq!(alert.household_members[0].first_name, "John");

        // No profile: silently left out.
        let alert = resolver().children_at_address(&snap, "29 15th St").unwrap();
        assert_eq!(alert, ChildAlert::default());

        let alert = resolver().children_at_address(&snap, "nowhere").unwrap();
        assert!(alert.children.is_empty() && alert.household_members.is_empty());
    }

    #[test]
    fn children_policy_can_be_made_strict() {
        let mut config = ResolverConfig::default();
        config.children_at_address.missing_profile = MissingProfilePolicy::Fail;
        let resolver = Resolver::new(config, Arc::new(FixedClock(today())));
        let err = resolver.children_at_address(&fixture(), "29 15th St").unwrap_err();
        assert_eq!(
            err,
            ExecutionError::MedicalProfileMissing {
                name: PersonName::new("Ghost", "Resident"),
                operation: CHILDREN,
            }
        );
    }

    #[test]
    fn phone_numbers_are_distinct_and_ordered() {
        let snap = fixture();
        let phones = resolver().phone_numbers_by_station(&snap, station(3));
        assert_eq!(phones, vec!["841-874-6512".to_string()]);

        let phones = resolver().phone_numbers_by_station(&snap, station(1));
        assert_eq!(phones, vec!["841-874-6544".to_string()]);

        assert!(resolver().phone_numbers_by_station(&snap, station(77)).is_empty());
    }

    #[test]
    fn residents_and_station_by_address() {
        let snap = fixture();
        let report = resolver()
            .residents_and_station_by_address(&snap, "644 Gershwin Cir")
            .unwrap();
        assert_eq!(report.station, StationLabel::Assigned(station(1)));
        assert_eq!(report.residents.len(), 1);
        assert_eq!(report.residents[0].age, 19);
        assert_eq!(report.residents[0].medications, vec!["peter-med:10mg".to_string()]);

        let report = resolver()
            .residents_and_station_by_address(&snap, "1 Unassigned Rd")
            .unwrap();
        assert_eq!(report.station, StationLabel::Unknown);
        assert!(report.residents.is_empty());

        let err = resolver()
            .residents_and_station_by_address(&snap, "29 15th St")
            .unwrap_err();
        assert!(matches!(err, ExecutionError::MedicalProfileMissing { .. }));
    }

    #[test]
    fn emails_by_city_ignore_city_case_only() {
        let snap = fixture();
        let r = resolver();
        let culver = r.emails_by_city(&snap, "Culver");
        assert_eq!(
            culver,
            vec![
                "jaboyd@email.com".to_string(),
                "tenz@email.com".to_string(),
                "ghost@email.com".to_string(),
            ]
        );
        assert_eq!(r.emails_by_city(&snap, "CULVER"), culver);
        assert_eq!(r.emails_by_city(&snap, "culver"), culver);
        assert!(r.emails_by_city(&snap, "Paris").is_empty());

        let mut config = ResolverConfig::default();
        config.city_match = NameMatch::Exact;
        let strict = Resolver::new(config, Arc::new(FixedClock(today())));
        assert!(strict.emails_by_city(&snap, "culver").is_empty());
    }

    #[test]
    fn households_group_by_address() {
        let snap = fixture();
        let groups = resolver()
            .households_by_stations(&snap, &[station(3), station(1), station(3)])
            .unwrap();
        let addresses: Vec<&str> = groups.iter().map(|g| g.address.as_str()).collect();
        // 908 73rd St has no residents and produces no group.
        assert_eq!(addresses, vec!["1509 Culver St", "644 Gershwin Cir"]);
        assert_eq!(groups[0].residents.len(), 3);
    }

    #[test]
    fn households_name_every_unknown_station() {
        let snap = fixture();
        let err = resolver()
            .households_by_stations(&snap, &[station(1), station(99), station(98), station(99)])
            .unwrap_err();
        assert_eq!(
            err,
            ExecutionError::StationsNotFound {
                stations: vec![station(99), station(98)],
            }
        );
    }

    #[test]
    fn person_info_ignores_case_and_reports_missing_profile() {
        let snap = fixture();
        let r = resolver();
        let a = r.person_info(&snap, "john", "BOYD").unwrap().unwrap();
        let b = r.person_info(&snap, "John", "Boyd").unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.age, 40);
        assert_eq!(a.email, "jaboyd@email.com");

        assert!(r.person_info(&snap, "Nobody", "Here").unwrap().is_none());

        let err = r.person_info(&snap, "ghost", "resident").unwrap_err();
        assert!(matches!(err, ExecutionError::MedicalProfileMissing { operation: PERSON_INFO, .. }));
    }

    #[test]
    fn reads_are_idempotent() {
        let snap = fixture();
        let r = resolver();
        assert_eq!(
            r.coverage_by_station(&snap, station(3)).unwrap(),
            r.coverage_by_station(&snap, station(3)).unwrap()
        );
        assert_eq!(
            r.households_by_stations(&snap, &[station(3)]).unwrap(),
            r.households_by_stations(&snap, &[station(3)]).unwrap()
        );
    }
}
