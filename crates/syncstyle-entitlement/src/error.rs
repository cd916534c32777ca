//! Entitlement errors

use thiserror::Error;

use syncstyle_db::DbError;

/// Errors raised while reading or writing the entitlement stores
///
/// The checks never return these; they are logged and turned into a denial.
/// Only the usage recorder propagates them.
#[derive(Error, Debug)]
pub enum EntitlementError {
    /// Store returned an error or a malformed row
    #[error("store error: {0}")]
    Store(#[from] DbError),

    /// Store read exceeded the configured timeout
    #[error("{store} store timed out")]
    Timeout {
        /// Store that timed out
        store: &'static str,
    },

    /// Usage quantity must be positive
    #[error("invalid quantity {0}: must be positive")]
    InvalidQuantity(i64),
}

impl EntitlementError {
    /// Whether the error came from a store rather than the caller
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Timeout { .. })
    }
}
