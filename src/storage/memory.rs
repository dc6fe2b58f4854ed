//! In-memory storage backend.
//!
//! Thread-safe implementation of [`RecordStore`] using an immutable snapshot
//! plus atomic swap: the collections live behind `RwLock<Arc<RecordSet>>`.
//! Readers clone the `Arc`; writers copy-on-write under the write lock, so a
//! query holding a snapshot never observes a concurrent mutation.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::config::StoreConfig;
use crate::medical::MedicalProfile;
use crate::resident::{NameMatch, PersonName, Resident};
use crate::station::{StationAssignment, StationNumber};
use crate::storage::snapshot::{RecordSet, RecordSnapshot};
use crate::storage::traits::{RecordStore, StorageError};

#[derive(Debug, Default)]
struct State {
    generation: u64,
    records: Arc<RecordSet>,
}

/// Thread-safe in-memory record store.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    state: RwLock<State>,
    config: StoreConfig,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with explicit policies.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: RwLock::default(),
            config,
        }
    }

    /// Create a store pre-populated with `records`.
    #[must_use]
    pub fn from_records(records: RecordSet, config: StoreConfig) -> Self {
        Self {
            state: RwLock::new(State {
                generation: 0,
                records: Arc::new(records),
            }),
            config,
        }
    }

    /// Run `f` under the write lock against collections no snapshot shares.
    /// `f` must check before it modifies: an `Err` leaves the records untouched.
    fn mutate<T>(
        &self,
        context: &'static str,
        f: impl FnOnce(&mut RecordSet) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::PoisonedLock(context))?;
        let out = f(Arc::make_mut(&mut state.records))?;
        state.generation += 1;
        Ok(out)
    }
}

fn remove_matching<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(|item| !pred(item));
    before - items.len()
}

impl RecordStore for InMemoryRecordStore {
    fn snapshot(&self) -> Result<RecordSnapshot, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::PoisonedLock("records.snapshot"))?;
        Ok(RecordSnapshot::new(state.generation, Arc::clone(&state.records)))
    }

    fn replace_all(&self, records: RecordSet) -> Result<(), StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::PoisonedLock("records.replace_all"))?;
        debug!(records = records.len(), "replacing all records");
        state.records = Arc::new(records);
        state.generation += 1;
        Ok(())
    }

    fn add_resident(&self, resident: Resident) -> Result<(), StorageError> {
        let unique = self.config.unique_identity;
        self.mutate("records.add_resident", |records| {
            if unique {
                let name = resident.name();
                if records.residents.iter().any(|r| r.is_named(&name, NameMatch::Exact)) {
                    return Err(StorageError::DuplicateIdentity(name));
                }
            }
            records.residents.push(resident);
            Ok(())
        })
    }

    fn update_resident(&self, resident: Resident) -> Result<Resident, StorageError> {
        self.mutate("records.update_resident", |records| {
            let name = resident.name();
            let existing = records
                .residents
                .iter_mut()
                .find(|r| r.is_named(&name, NameMatch::Exact))
                .ok_or(StorageError::ResidentNotFound(name))?;
            existing.apply_update(resident);
            Ok(existing.clone())
        })
    }

    fn delete_resident(&self, name: &PersonName) -> Result<usize, StorageError> {
        self.mutate("records.delete_resident", |records| {
            Ok(remove_matching(&mut records.residents, |r| {
                r.is_named(name, NameMatch::Exact)
            }))
        })
    }

    fn add_station(&self, assignment: StationAssignment) -> Result<(), StorageError> {
        self.mutate("records.add_station", |records| {
            if let Some(existing) = records
                .stations
                .iter()
                .find(|s| s.address == assignment.address)
            {
                return Err(StorageError::AddressAlreadyAssigned {
                    address: assignment.address,
                    station: existing.station,
                });
            }
            records.stations.push(assignment);
            Ok(())
        })
    }

    fn update_station(&self, assignment: StationAssignment) -> Result<StationAssignment, StorageError> {
        self.mutate("records.update_station", |records| {
            let existing = records
                .stations
                .iter_mut()
                .find(|s| s.address == assignment.address)
                .ok_or_else(|| StorageError::AddressNotFound(assignment.address.clone()))?;
            existing.station = assignment.station;
            Ok(existing.clone())
        })
    }

    fn delete_station_by_address(&self, address: &str) -> Result<usize, StorageError> {
        self.mutate("records.delete_station_by_address", |records| {
            Ok(remove_matching(&mut records.stations, |s| s.address == address))
        })
    }

    fn delete_stations_by_number(&self, station: StationNumber) -> Result<usize, StorageError> {
        self.mutate("records.delete_stations_by_number", |records| {
            Ok(remove_matching(&mut records.stations, |s| s.station == station))
        })
    }

    fn add_profile(&self, profile: MedicalProfile) -> Result<(), StorageError> {
        let unique = self.config.unique_identity;
        self.mutate("records.add_profile", |records| {
            if unique {
                let name = profile.name();
                if records.profiles.iter().any(|p| p.is_named(&name, NameMatch::Exact)) {
                    return Err(StorageError::DuplicateIdentity(name));
                }
            }
            records.profiles.push(profile);
            Ok(())
        })
    }

    fn update_profile(&self, profile: MedicalProfile) -> Result<MedicalProfile, StorageError> {
        self.mutate("records.update_profile", |records| {
            let name = profile.name();
            let existing = records
                .profiles
                .iter_mut()
                .find(|p| p.is_named(&name, NameMatch::Exact))
                .ok_or(StorageError::ProfileNotFound(name))?;
            existing.apply_update(profile);
            Ok(existing.clone())
        })
    }

    fn delete_profile(&self, name: &PersonName) -> Result<usize, StorageError> {
        self.mutate("records.delete_profile", |records| {
            Ok(remove_matching(&mut records.profiles, |p| {
                p.is_named(name, NameMatch::Exact)
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn resident(first: &str, last: &str, address: &str) -> Resident {
        Resident {
            first_name: first.to_string(),
            last_name: last.to_string(),
            address: address.to_string(),
            city: "Culver".to_string(),
            zip: "97451".to_string(),
            phone: "841-874-6512".to_string(),
            email: format!("{}@email.com", first.to_lowercase()),
        }
    }

    fn profile(first: &str, last: &str) -> MedicalProfile {
        MedicalProfile {
            first_name: first.to_string(),
            last_name: last.to_string(),
            birthdate: NaiveDate::from_ymd_opt(1984, 3, 6).unwrap(),
            medications: vec!["aznol:350mg".to_string()],
            allergies: vec![],
        }
    }

    fn station(n: u32) -> StationNumber {
        StationNumber::new(n).unwrap()
    }

    #[test]
    fn resident_add_update_delete() {
        let store = InMemoryRecordStore::new();
        store.add_resident(resident("John", "Boyd", "1509 Culver St")).unwrap();
        // No uniqueness by default.
        store.add_resident(resident("John", "Boyd", "29 15th St")).unwrap();

        let mut update = resident("John", "Boyd", "834 Binoc Ave");
        update.phone = "841-874-0000".to_string();
        let updated = store.update_resident(update).unwrap();
        assert_eq!(updated.address, "834 Binoc Ave");

        // First match wins on update.
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.residents()[0].address, "834 Binoc Ave");
        assert_eq!(snap.residents()[1].address, "29 15th St");

        let err = store.update_resident(resident("john", "boyd", "x")).unwrap_err();
        assert!(matches!(err, StorageError::ResidentNotFound(_)));

        assert_eq!(store.delete_resident(&PersonName::new("John", "Boyd")).unwrap(), 2);
        assert_eq!(store.delete_resident(&PersonName::new("John", "Boyd")).unwrap(), 0);
    }

    #[test]
    fn unique_identity_rejects_second_record() {
        let store = InMemoryRecordStore::with_config(StoreConfig { unique_identity: true });
        store.add_resident(resident("John", "Boyd", "a")).unwrap();
        let err = store.add_resident(resident("John", "Boyd", "b")).unwrap_err();
        assert_eq!(err, StorageError::DuplicateIdentity(PersonName::new("John", "Boyd")));
        // Case differs, so it is a different key.
        store.add_resident(resident("john", "Boyd", "c")).unwrap();

        store.add_profile(profile("John", "Boyd")).unwrap();
        assert!(store.add_profile(profile("John", "Boyd")).is_err());
    }

    #[test]
    fn station_conflict_update_and_bulk_delete() {
        let store = InMemoryRecordStore::new();
        store.add_station(StationAssignment::new("1509 Culver St", station(3))).unwrap();
        store.add_station(StationAssignment::new("29 15th St", station(2))).unwrap();
        store.add_station(StationAssignment::new("834 Binoc Ave", station(3))).unwrap();

        let err = store
            .add_station(StationAssignment::new("1509 Culver St", station(1)))
            .unwrap_err();
        assert_eq!(
            err,
            StorageError::AddressAlreadyAssigned {
                address: "1509 Culver St".to_string(),
                station: station(3),
            }
        );

        let updated = store
            .update_station(StationAssignment::new("29 15th St", station(4)))
            .unwrap();
        assert_eq!(updated.station, station(4));
        assert!(matches!(
            store.update_station(StationAssignment::new("nowhere", station(4))),
            Err(StorageError::AddressNotFound(_))
        ));

        assert_eq!(store.delete_stations_by_number(station(3)).unwrap(), 2);
        assert_eq!(store.delete_station_by_address("29 15th St").unwrap(), 1);
        assert!(store.snapshot().unwrap().stations().is_empty());
    }

    #[test]
    fn profile_update_and_delete() {
        let store = InMemoryRecordStore::new();
        store.add_profile(profile("John", "Boyd")).unwrap();
        let mut update = profile("John", "Boyd");
        update.allergies = vec!["peanut".to_string()];
        let updated = store.update_profile(update).unwrap();
        assert_eq!(updated.allergies, vec!["peanut".to_string()]);
        assert!(matches!(
            store.update_profile(profile("Jane", "Doe")),
            Err(StorageError::ProfileNotFound(_))
        ));
        assert_eq!(store.delete_profile(&PersonName::new("John", "Boyd")).unwrap(), 1);
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let store = InMemoryRecordStore::new();
        store.add_resident(resident("John", "Boyd", "1509 Culver St")).unwrap();
        let before = store.snapshot().unwrap();

        store.add_resident(resident("Jacob", "Boyd", "1509 Culver St")).unwrap();
        store.delete_resident(&PersonName::new("John", "Boyd")).unwrap();

        assert_eq!(before.residents().len(), 1);
        assert_eq!(before.residents()[0].first_name, "John");
        let after = store.snapshot().unwrap();
        assert_eq!(after.residents().len(), 1);
        assert_eq!(after.residents()[0].first_name, "Jacob");
        assert!(after.generation() > before.generation());
    }

    #[test]
    fn failed_write_leaves_generation_alone() {
        let store = InMemoryRecordStore::new();
        store.add_station(StationAssignment::new("a", station(1))).unwrap();
        let gen = store.snapshot().unwrap().generation();
        assert!(store.add_station(StationAssignment::new("a", station(2))).is_err());
        assert_eq!(store.snapshot().unwrap().generation(), gen);
    }
}
