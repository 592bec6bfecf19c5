// src/storage/mod.rs
// DOCUMENTATION: Storage module organization
// PURPOSE: Re-export storage components

pub mod gcs;
pub mod object_store;

pub use gcs::GcsObjectStore;
pub use object_store::{ObjectRecord, ObjectStore};
