//! In-memory registry of provisioned databases.
//!
//! Layout:
//! - `store.rs`: the ordered, case-insensitive record collection
//! - `actor.rs`: ractor actor that owns the store and serializes every access

pub mod actor;
pub mod store;

pub use actor::{RegistryHandle, Reservation, spawn};
pub use store::{DatabaseRecord, Registry, fold_name};
