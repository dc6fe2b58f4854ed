//! Lookup indices derived from a record snapshot.
//!
//! Indices borrow from the snapshot they were built from and are rebuilt
//! for every resolver call, so a query always sees one consistent
//! generation of the data.
//!
//! Identity keys are not unique, so every index keeps the first record in
//! insertion order for a key. The same rule applies to station
//! assignments: if an address was assigned twice, the first assignment
//! wins and the second is ignored (and logged).

use std::cell::OnceCell;
use std::collections::HashMap;

use tracing::warn;

use crate::medical::MedicalProfile;
use crate::resident::{NameMatch, Resident};
use crate::station::StationNumber;
use crate::storage::RecordSnapshot;

fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Lookup structures over one snapshot.
#[derive(Debug)]
pub struct Indices<'a> {
    residents: &'a [Resident],
    profiles: &'a [MedicalProfile],
    address_to_station: HashMap<&'a str, StationNumber>,
    station_to_addresses: HashMap<StationNumber, Vec<&'a str>>,
    address_to_residents: HashMap<&'a str, Vec<&'a Resident>>,
    /// first name -> last name -> profile
    identity_to_profile: HashMap<&'a str, HashMap<&'a str, &'a MedicalProfile>>,
    folded_identity_to_profile: OnceCell<HashMap<(String, String), &'a MedicalProfile>>,
}

impl<'a> Indices<'a> {
    /// Build every index from `snapshot`.
    #[must_use]
    pub fn build(snapshot: &'a RecordSnapshot) -> Self {
        let mut address_to_station: HashMap<&'a str, StationNumber> = HashMap::new();
        let mut station_to_addresses: HashMap<StationNumber, Vec<&'a str>> = HashMap::new();
        for assignment in snapshot.stations() {
            let address = assignment.address.as_str();
            if let Some(first) = address_to_station.get(address) {
                warn!(
                    address,
                    kept = %first,
                    ignored = %assignment.station,
                    "duplicate station assignment, keeping the first"
                );
                continue;
            }
            address_to_station.insert(address, assignment.station);
            station_to_addresses
                .entry(assignment.station)
                .or_default()
                .push(address);
        }

        let mut address_to_residents: HashMap<&'a str, Vec<&'a Resident>> = HashMap::new();
        for resident in snapshot.residents() {
            address_to_residents
                .entry(resident.address.as_str())
                .or_default()
                .push(resident);
        }

        let mut identity_to_profile: HashMap<&'a str, HashMap<&'a str, &'a MedicalProfile>> =
            HashMap::new();
        for profile in snapshot.profiles() {
            identity_to_profile
                .entry(profile.first_name.as_str())
                .or_default()
                .entry(profile.last_name.as_str())
                .or_insert(profile);
        }

        Self {
            residents: snapshot.residents(),
            profiles: snapshot.profiles(),
            address_to_station,
            station_to_addresses,
            address_to_residents,
            identity_to_profile,
            folded_identity_to_profile: OnceCell::new(),
        }
    }

    /// Station covering `address`, if it is assigned.
    #[must_use]
    pub fn station_for(&self, address: &str) -> Option<StationNumber> {
        self.address_to_station.get(address).copied()
    }

    /// Addresses covered by `station` in assignment order, or `None` if the
    /// station has no assignment at all.
    #[must_use]
    pub fn addresses_for(&self, station: StationNumber) -> Option<&[&'a str]> {
        self.station_to_addresses.get(&station).map(Vec::as_slice)
    }

    /// Residents living at `address` in insertion order.
    #[must_use]
    pub fn residents_at(&self, address: &str) -> &[&'a Resident] {
        self.address_to_residents
            .get(address)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All residents in insertion order.
    #[must_use]
    pub fn residents(&self) -> &'a [Resident] {
        self.residents
    }

    /// First resident named `first_name last_name` under `mode`.
    #[must_use]
    pub fn find_resident(&self, first_name: &str, last_name: &str, mode: NameMatch) -> Option<&'a Resident> {
        self.residents.iter().find(|r| {
            mode.matches(&r.first_name, first_name) && mode.matches(&r.last_name, last_name)
        })
    }

    /// First medical profile for the name under `mode`.
    #[must_use]
    pub fn profile_for(&self, first_name: &str, last_name: &str, mode: NameMatch) -> Option<&'a MedicalProfile> {
        match mode {
            NameMatch::Exact => self
                .identity_to_profile
                .get(first_name)
                .and_then(|by_last| by_last.get(last_name))
                .copied(),
            NameMatch::IgnoreCase => self
                .folded_profiles()
                .get(&(fold(first_name), fold(last_name)))
                .copied(),
        }
    }

    /// Profile joined to `resident` by name.
    #[must_use]
    pub fn profile_of(&self, resident: &Resident, mode: NameMatch) -> Option<&'a MedicalProfile> {
        self.profile_for(&resident.first_name, &resident.last_name, mode)
    }

    fn folded_profiles(&self) -> &HashMap<(String, String), &'a MedicalProfile> {
        self.folded_identity_to_profile.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.profiles.len());
            for profile in self.profiles {
                map.entry((fold(&profile.first_name), fold(&profile.last_name)))
                    .or_insert(profile);
            }
            map
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::station::StationAssignment;
    use crate::storage::RecordSet;

    fn resident(first: &str, last: &str, address: &str) -> Resident {
        Resident {
            first_name: first.to_string(),
            last_name: last.to_string(),
            address: address.to_string(),
            city: "Culver".to_string(),
            zip: "97451".to_string(),
            phone: "841-874-6512".to_string(),
            email: "x@email.com".to_string(),
        }
    }

    fn profile(first: &str, last: &str, year: i32) -> MedicalProfile {
        MedicalProfile {
            first_name: first.to_string(),
            last_name: last.to_string(),
            birthdate: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            medications: vec![],
            allergies: vec![],
        }
    }

    fn station(n: u32) -> StationNumber {
        StationNumber::new(n).unwrap()
    }

    fn snapshot() -> RecordSnapshot {
        RecordSnapshot::detached(RecordSet {
            residents: vec![
                resident("John", "Boyd", "1509 Culver St"),
                resident("Tenley", "Boyd", "1509 Culver St"),
                resident("Peter", "Duncan", "644 Gershwin Cir"),
            ],
            stations: vec![
                StationAssignment::new("1509 Culver St", station(3)),
                StationAssignment::new("644 Gershwin Cir", station(1)),
                StationAssignment::new("1509 Culver St", station(2)),
            ],
            profiles: vec![
                profile("John", "Boyd", 1984),
                profile("John", "Boyd", 1990),
                profile("Tenley", "Boyd", 2012),
            ],
        })
    }

    #[test]
    fn first_station_assignment_wins() {
        let snap = snapshot();
        let idx = Indices::build(&snap);
        assert_eq!(idx.station_for("1509 Culver St"), Some(station(3)));
        assert_eq!(idx.addresses_for(station(3)), Some(&["1509 Culver St"][..]));
        // The shadowed duplicate does not create a station entry.
        assert!(idx.addresses_for(station(2)).is_none());
        assert!(idx.station_for("unknown").is_none());
    }

    #[test]
    fn residents_grouped_by_address_in_order() {
        let snap = snapshot();
        let idx = Indices::build(&snap);
        let names: Vec<&str> = idx
            .residents_at("1509 Culver St")
            .iter()
            .map(|r| r.first_name.as_str())
            .collect();
        assert_eq!(names, vec!["John", "Tenley"]);
        assert!(idx.residents_at("nowhere").is_empty());
    }

    #[test]
    fn profile_lookup_first_match_and_case_modes() {
        let snap = snapshot();
        let idx = Indices::build(&snap);
        let p = idx.profile_for("John", "Boyd", NameMatch::Exact).unwrap();
        assert_eq!(p.birthdate.format("%Y").to_string(), "1984");

        assert!(idx.profile_for("john", "BOYD", NameMatch::Exact).is_none());
        let p = idx.profile_for("john", "BOYD", NameMatch::IgnoreCase).unwrap();
        assert_eq!(p.birthdate.format("%Y").to_string(), "1984");
    }

    #[test]
    fn find_resident_respects_mode() {
        let snap = snapshot();
        let idx = Indices::build(&snap);
        assert!(idx.find_resident("peter", "duncan", NameMatch::Exact).is_none());
        let r = idx.find_resident("peter", "duncan", NameMatch::IgnoreCase).unwrap();
        assert_eq!(r.address, "644 Gershwin Cir");
    }
}
