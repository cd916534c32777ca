//! Common error types

use thiserror::Error;

/// Errors raised when parsing identifiers from the closed enumerations
/// or validating catalog values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Feature identifier is not part of the feature catalog
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// Usage type identifier is not a metered usage type
    #[error("unknown usage type: {0}")]
    UnknownUsageType(String),

    /// Tier name is empty or contains invalid characters
    #[error("invalid tier name: {0:?}")]
    InvalidTierName(String),

    /// Usage limit outside the accepted range (-1 or non-negative)
    #[error("invalid usage limit: {0}")]
    InvalidLimit(i64),
}
