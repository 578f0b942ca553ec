//! Storage for the student registry
//!
//! The registry is mirrored to a single JSON document that is rewritten in
//! full on every flush.

pub mod json_snapshot;

pub use json_snapshot::{JsonSnapshotFile, Snapshot, MAX_STUDENT_ID};
