//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Row failed validation at the store boundary
    #[error("malformed {table} row {key}: {reason}")]
    Malformed {
        /// Table the row came from
        table: &'static str,
        /// Row key
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// Value does not fit the column type
    #[error("value out of range: {0}")]
    OutOfRange(&'static str),
}

impl DbError {
    pub(crate) fn malformed(
        table: &'static str,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            table,
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for database operations
pub type DbResult<T> = Result<T, DbError>;
