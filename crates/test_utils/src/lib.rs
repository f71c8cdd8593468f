//! Test Utilities Crate
//!
//! Shared test infrastructure for the provider hub workspace.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built countries, feed records, and provider graphs
//! - `builders`: Builder patterns for aggregate test data construction
//!
//! The crate's own `tests/` directory holds the cross-domain integration
//! suite that drives the writers and the synchronizer together against the
//! in-memory mock stores.

pub mod builders;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;
