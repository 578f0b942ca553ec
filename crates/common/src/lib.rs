//! Shared helpers used by every crate in the workspace: logging setup,
//! filesystem sanity checks, and small wire types.

pub mod env;
pub mod types;
pub mod utils;
