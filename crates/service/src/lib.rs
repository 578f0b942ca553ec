//! Service layer owning the student registry.
//! - `registry`: the in-memory map, id assignment, and locking discipline.
//! - `storage`: the JSON document the registry is mirrored to.
//! - `assets`: per-student photo storage.

pub mod assets;
pub mod errors;
pub mod registry;
pub mod storage;

pub use errors::ServiceError;
pub use registry::{IdPolicy, StudentRegistry};
