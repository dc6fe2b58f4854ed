//! Execution engine for AlertNet requests.
//!
//! This module provides a synchronous executor that validates an
//! [`AlertRequest`], applies it against a pluggable [`RecordStore`] through
//! the [`Resolver`], and optionally writes the data document back after
//! every successful mutation.

use std::io::ErrorKind;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::config::ServiceConfig;
use crate::error::{AlertError, AlertResult, ExecutionError, PersistenceError};
use crate::ir::{AlertRequest, Operation};
use crate::medical::MedicalProfile;
use crate::resident::Resident;
use crate::resolve::{
    AddressGroup, AddressReport, ChildAlert, CoverageSummary, PersonInfo, Resolver,
};
use crate::station::StationAssignment;
use crate::storage::{
    InMemoryRecordStore, JsonFilePersistence, Persistence, RecordSet, RecordSnapshot, RecordStore,
};
use crate::time::Clock;

/// Result of executing an AlertNet operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineResponse {
    /// Result of `coverage_by_station`.
    Coverage(CoverageSummary),

    /// Result of `children_at_address`.
    ChildAlert(ChildAlert),

    /// Result of `phone_numbers_by_station`.
    PhoneNumbers { phones: Vec<String> },

    /// Result of `residents_and_station_by_address`.
    AddressReport(AddressReport),

    /// Result of `emails_by_city`.
    Emails { emails: Vec<String> },

    /// Result of `households_by_stations`.
    Households { households: Vec<AddressGroup> },

    /// Result of `person_info`; `None` when nobody has that name.
    PersonInfo { person: Option<PersonInfo> },

    /// A resident as stored after an add or update.
    Resident(Resident),

    /// A station assignment as stored after an add or update.
    Station(StationAssignment),

    /// A medical profile as stored after an add or update.
    Profile(MedicalProfile),

    /// Result of any delete.
    Removed { removed: usize },

    Residents { residents: Vec<Resident> },
    Stations { stations: Vec<StationAssignment> },
    Profiles { profiles: Vec<MedicalProfile> },
}

/// AlertNet execution engine.
#[derive(Clone)]
pub struct AlertEngine {
    store: Arc<dyn RecordStore>,
    resolver: Resolver,
    persistence: Option<Arc<dyn Persistence>>,
    save_on_mutation: bool,
    /// Generation most recently written by `persistence`.
    last_saved: Arc<Mutex<u64>>,
}

impl std::fmt::Debug for AlertEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertEngine")
            .field("resolver", &self.resolver)
            .field("persistent", &self.persistence.is_some())
            .field("save_on_mutation", &self.save_on_mutation)
            .finish_non_exhaustive()
    }
}

impl AlertEngine {
    /// Create an engine over `store` without persistence.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, resolver: Resolver) -> Self {
        Self {
            store,
            resolver,
            persistence: None,
            save_on_mutation: false,
            last_saved: Arc::new(Mutex::new(0)),
        }
    }

    /// Attach a persistence backend. When `save_on_mutation` is set, every
    /// successful mutation writes the full record set back.
    #[must_use]
    pub fn with_persistence(mut self, persistence: Arc<dyn Persistence>, save_on_mutation: bool) -> Self {
        self.persistence = Some(persistence);
        self.save_on_mutation = save_on_mutation;
        self
    }

    /// Build an engine from configuration, loading the data file if one is
    /// configured.
    ///
    /// With `save_on_mutation` set, a data file that does not exist yet is
    /// treated as an empty document and created by the first mutation.
    ///
    /// # Errors
    /// - Validation errors from [`ServiceConfig::validate`]
    /// - Persistence errors while reading the data file
    pub fn from_config(config: ServiceConfig, clock: Arc<dyn Clock>) -> AlertResult<Self> {
        let config = config.validate()?;
        let resolver = Resolver::new(config.resolver, clock);
        let Some(path) = config.data_file else {
            let store = Arc::new(InMemoryRecordStore::with_config(config.store));
            return Ok(Self::new(store, resolver));
        };

        let persistence = JsonFilePersistence::new(path);
        let records = match persistence.load() {
            Err(PersistenceError::Io { path, source })
                if config.save_on_mutation && source.kind() == ErrorKind::NotFound =>
            {
                info!(path = %path.display(), "data file missing, starting from an empty document");
                RecordSet::default()
            }
            loaded => loaded?,
        };
        let store = Arc::new(InMemoryRecordStore::from_records(records, config.store));
        Ok(Self::new(store, resolver).with_persistence(Arc::new(persistence), config.save_on_mutation))
    }

    /// Get a reference to the record store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Get a reference to the resolver.
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Consistent view of the store.
    ///
    /// # Errors
    /// - `PoisonedLock` if a writer panicked
    pub fn snapshot(&self) -> AlertResult<RecordSnapshot> {
        Ok(self.store.snapshot()?)
    }

    /// Execute a request.
    ///
    /// # Errors
    /// Any [`AlertError`]; use [`AlertError::status`] to map it for a caller.
    pub fn execute(&self, request: AlertRequest) -> AlertResult<EngineResponse> {
        let span = info_span!(
            "alert_request",
            request_id = %request.request_id,
            op = request.operation.name()
        );
        let _enter = span.enter();

        // Deserialized requests are untrusted; validate before touching the store.
        request.validate()?;
        info!("executing request");

        let Some(persistence) = self.saving().filter(|_| request.operation.is_mutation()) else {
            return self.dispatch(request.operation);
        };

        // Mutations and their save run under the save lock; a failed save
        // puts the pre-mutation records back so an error leaves no change.
        let mut last_saved = self.lock_saves()?;
        let before = self.store.snapshot()?;
        let response = self.dispatch(request.operation)?;
        if let Err(err) = self.save_locked(persistence, &mut last_saved) {
            warn!(error = %err, generation = before.generation(), "save failed, rolling back mutation");
            self.store.replace_all(before.records().clone())?;
            return Err(err);
        }
        Ok(response)
    }

    /// Save the current records if persistence is on and they are newer
    /// than what was last written.
    ///
    /// # Errors
    /// - Persistence errors from the backend
    pub fn persist(&self) -> AlertResult<()> {
        let Some(persistence) = self.saving() else {
            return Ok(());
        };
        let mut last_saved = self.lock_saves()?;
        self.save_locked(persistence, &mut last_saved)
    }

    fn saving(&self) -> Option<&Arc<dyn Persistence>> {
        self.persistence.as_ref().filter(|_| self.save_on_mutation)
    }

    fn lock_saves(&self) -> AlertResult<MutexGuard<'_, u64>> {
        self.last_saved
            .lock()
            .map_err(|_| AlertError::internal("save lock poisoned"))
    }

    fn save_locked(&self, persistence: &Arc<dyn Persistence>, last_saved: &mut u64) -> AlertResult<()> {
        // Snapshot under the save lock so a slower writer cannot overwrite
        // a newer document with an older one.
        let snapshot = self.store.snapshot()?;
        if snapshot.generation() <= *last_saved {
            debug!(
                generation = snapshot.generation(),
                last_saved = *last_saved,
                "document already up to date"
            );
            return Ok(());
        }
        persistence.save(snapshot.records())?;
        *last_saved = snapshot.generation();
        Ok(())
    }

    fn dispatch(&self, operation: Operation) -> AlertResult<EngineResponse> {
        match operation {
            Operation::CoverageByStation(q) => {
                let snapshot = self.snapshot()?;
                Ok(EngineResponse::Coverage(
                    self.resolver.coverage_by_station(&snapshot, q.station)?,
                ))
            }
            Operation::ChildrenAtAddress(q) => {
                let snapshot = self.snapshot()?;
                Ok(EngineResponse::ChildAlert(
                    self.resolver.children_at_address(&snapshot, &q.address)?,
                ))
            }
            Operation::PhoneNumbersByStation(q) => {
                let snapshot = self.snapshot()?;
                Ok(EngineResponse::PhoneNumbers {
                    phones: self.resolver.phone_numbers_by_station(&snapshot, q.station),
                })
            }
            Operation::ResidentsAndStationByAddress(q) => {
                let snapshot = self.snapshot()?;
                Ok(EngineResponse::AddressReport(
                    self.resolver.residents_and_station_by_address(&snapshot, &q.address)?,
                ))
            }
            Operation::EmailsByCity(q) => {
                let snapshot = self.snapshot()?;
                Ok(EngineResponse::Emails {
                    emails: self.resolver.emails_by_city(&snapshot, &q.city),
                })
            }
            Operation::HouseholdsByStations(q) => {
                let snapshot = self.snapshot()?;
                Ok(EngineResponse::Households {
                    households: self.resolver.households_by_stations(&snapshot, &q.stations)?,
                })
            }
            Operation::PersonInfo(name) => {
                let snapshot = self.snapshot()?;
                Ok(EngineResponse::PersonInfo {
                    person: self
                        .resolver
                        .person_info(&snapshot, &name.first_name, &name.last_name)?,
                })
            }

            Operation::AddResident(resident) => {
                info!(resident = %resident.name(), "adding resident");
                self.store.add_resident(resident.clone())?;
                Ok(EngineResponse::Resident(resident))
            }
            Operation::UpdateResident(resident) => {
                info!(resident = %resident.name(), "updating resident");
                Ok(EngineResponse::Resident(self.store.update_resident(resident)?))
            }
            Operation::DeleteResident(name) => {
                info!(resident = %name, "deleting resident");
                let removed = self.store.delete_resident(&name)?;
                Self::removed(removed, || format!("resident {name}"))
            }

            Operation::AddStation(assignment) => {
                info!(address = %assignment.address, station = %assignment.station, "assigning address");
                self.store.add_station(assignment.clone())?;
                Ok(EngineResponse::Station(assignment))
            }
            Operation::UpdateStation(assignment) => {
                info!(address = %assignment.address, station = %assignment.station, "reassigning address");
                Ok(EngineResponse::Station(self.store.update_station(assignment)?))
            }
            Operation::DeleteStationByAddress(q) => {
                info!(address = %q.address, "deleting station assignment");
                let removed = self.store.delete_station_by_address(&q.address)?;
                Self::removed(removed, || format!("station assignment for '{}'", q.address))
            }
            Operation::DeleteStationsByNumber(q) => {
                info!(station = %q.station, "deleting station assignments");
                let removed = self.store.delete_stations_by_number(q.station)?;
                Self::removed(removed, || format!("assignments to station {}", q.station))
            }

            Operation::AddProfile(profile) => {
                info!(profile = %profile.name(), "adding medical profile");
                self.store.add_profile(profile.clone())?;
                Ok(EngineResponse::Profile(profile))
            }
            Operation::UpdateProfile(profile) => {
                info!(profile = %profile.name(), "updating medical profile");
                Ok(EngineResponse::Profile(self.store.update_profile(profile)?))
            }
            Operation::DeleteProfile(name) => {
                info!(profile = %name, "deleting medical profile");
                let removed = self.store.delete_profile(&name)?;
                Self::removed(removed, || format!("medical profile {name}"))
            }

            Operation::ListResidents => Ok(EngineResponse::Residents {
                residents: self.snapshot()?.residents().to_vec(),
            }),
            Operation::ListStations => Ok(EngineResponse::Stations {
                stations: self.snapshot()?.stations().to_vec(),
            }),
            Operation::ListProfiles => Ok(EngineResponse::Profiles {
                profiles: self.snapshot()?.profiles().to_vec(),
            }),
        }
    }

    fn removed(removed: usize, target: impl FnOnce() -> String) -> AlertResult<EngineResponse> {
        if removed == 0 {
            let target = target();
            warn!(%target, "delete matched nothing");
            return Err(ExecutionError::NothingRemoved { target }.into());
        }
        Ok(EngineResponse::Removed { removed })
    }
}
