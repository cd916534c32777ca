//! Shared handler utilities
//!
//! Boundary validation and metrics helpers used across handlers. Identifiers
//! from the closed enumerations are parsed here so unknown values become a
//! 400 before any store is touched.

use std::time::Instant;

use syncstyle_types::{Feature, TierName, UsageType, UserId};

use crate::error::ApiError;

// ============================================================================
// Input Validation
// ============================================================================

/// Maximum length for caller-supplied redirect URLs
pub const MAX_URL_LEN: usize = 2048;

/// Parse a user ID
pub fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::parse(raw).map_err(|_| ApiError::BadRequest("Invalid user_id".into()))
}

/// Parse a feature identifier
pub fn parse_feature(raw: &str) -> Result<Feature, ApiError> {
    raw.parse::<Feature>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Parse a usage type identifier
pub fn parse_usage_type(raw: &str) -> Result<UsageType, ApiError> {
    raw.parse::<UsageType>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Parse a tier name
pub fn parse_tier(raw: &str) -> Result<TierName, ApiError> {
    if raw == TierName::FREE {
        return Err(ApiError::BadRequest("The free tier cannot be purchased".into()));
    }
    TierName::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Validate an optional redirect URL.
///
/// # Security
/// - Only absolute http(s) URLs, so Stripe never redirects to `javascript:`
///   or other schemes
/// - Bounded length
pub fn validate_redirect_url(url: Option<&str>, field_name: &str) -> Result<(), ApiError> {
    let Some(url) = url else {
        return Ok(());
    };

    if url.len() > MAX_URL_LEN {
        return Err(ApiError::BadRequest(format!(
            "{field_name} too long (max {MAX_URL_LEN} chars)"
        )));
    }

    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ApiError::BadRequest(format!(
            "{field_name} must be an absolute http(s) URL"
        )));
    }

    if url.chars().any(char::is_whitespace) {
        return Err(ApiError::BadRequest(format!(
            "{field_name} must not contain whitespace"
        )));
    }

    Ok(())
}

// ============================================================================
// Metrics Helpers
// ============================================================================

/// Record HTTP operation duration with result label.
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "http_request_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

// ============================================================================
// Tests
// ============================================================================
