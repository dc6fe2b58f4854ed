//! Intermediate Representation (IR) for AlertNet requests.
//!
//! The IR provides a serializable, transportable format for every query
//! and mutation. This enables:
//! - A JSON wire format for the command-line front end and any transport
//! - Validation in one place, before the store or resolver is touched
//! - Request logging and replay

mod operations;
mod serialization;
mod validation;

pub use operations::{
    AddressQuery, AlertRequest, CityQuery, Operation, StationQuery, StationsQuery,
};

pub use serialization::{from_json, from_json_lenient, to_json_pretty};
pub use validation::{MAX_LIST_LEN, MAX_TEXT_LEN};
