//! Record storage for AlertNet.
//!
//! The [`RecordStore`] trait is the only way callers touch the three base
//! collections. Reads go through immutable [`RecordSnapshot`]s; writes are
//! serialized by the backend.

mod memory;
mod persistent;
mod snapshot;
mod traits;

pub use memory::InMemoryRecordStore;
pub use persistent::{JsonFilePersistence, Persistence};
pub use snapshot::{RecordSet, RecordSnapshot};
pub use traits::{RecordStore, StorageError};
