//! The student registry: sole owner of the id → record map.

pub mod store;

pub use configs::IdPolicy;
pub use store::StudentRegistry;
