//! Catalog domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors surfaced by catalog operations.
///
/// Validation-shaped conditions (an empty feed, records with missing fields)
/// are not errors; they are logged and skipped. Anything here aborts the
/// in-flight synchronization.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The external feed could not be reached or returned garbage
    #[error("country feed failed: {0}")]
    Feed(#[source] PortError),

    /// A storage operation failed
    #[error("catalog operation failed: {0}")]
    Store(#[from] PortError),
}
