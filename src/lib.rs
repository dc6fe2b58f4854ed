//! # AlertNet - Emergency Dispatch Resolution
//!
//! AlertNet answers dispatch questions ("who lives near fire station 3",
//! "which children live at this address", "what is this person allergic
//! to") by cross-referencing three flat record collections held in memory.
//!
//! ## Core Concepts
//!
//! - **Resident**: A person with contact details, identified by first and last name
//! - **Station assignment**: Maps one street address to the fire station covering it
//! - **Medical profile**: Birthdate, medications and allergies, joined to residents by name
//! - **Resolver**: Joins the three collections into answer views, deriving ages on the fly
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use alertnet::{AlertEngine, AlertRequest, InMemoryRecordStore, Operation, Resolver, StationNumber};
//! use alertnet::ir::StationQuery;
//!
//! let store = Arc::new(InMemoryRecordStore::new());
//! let engine = AlertEngine::new(store, Resolver::default());
//!
//! let response = engine.execute(AlertRequest::new(Operation::CoverageByStation(
//!     StationQuery { station: StationNumber::new(3)? },
//! )))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Base records
pub mod medical;
pub mod resident;
pub mod station;
pub mod time;

// Storage and resolution
pub mod index;
pub mod resolve;
pub mod storage;

// Requests and execution
pub mod config;
pub mod engine;
pub mod error;
pub mod ir;

// Re-export primary types at crate root for convenience
pub use medical::MedicalProfile;
pub use resident::{NameMatch, PersonName, Resident};
pub use station::{StationAssignment, StationLabel, StationNumber};
pub use time::{Clock, FixedClock, SystemClock};

pub use index::Indices;
pub use resolve::{
    AddressGroup, AddressReport, ChildAlert, ChildRecord, CoverageSummary, CoveredResident,
    HouseholdMember, MissingProfilePolicy, OperationPolicy, PersonInfo, ResidentWithMedicalInfo,
    Resolver, ResolverConfig,
};
pub use storage::{
    InMemoryRecordStore, JsonFilePersistence, Persistence, RecordSet, RecordSnapshot, RecordStore,
    StorageError,
};

pub use config::{ServiceConfig, StoreConfig};
pub use engine::{AlertEngine, EngineResponse};
pub use error::{
    AlertError, AlertResult, ExecutionError, PersistenceError, Status, ValidationError,
};
pub use ir::{AlertRequest, Operation};
