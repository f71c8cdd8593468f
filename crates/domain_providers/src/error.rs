//! Provider domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors surfaced by aggregate operations.
///
/// Not-found and no-changes conditions are values ([`core_kernel::WriteOutcome`]),
/// not errors; anything here aborted the whole in-flight operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A storage operation failed; the original cause is preserved
    #[error("aggregate operation failed: {0}")]
    Store(#[from] PortError),
}
