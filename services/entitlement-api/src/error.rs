//! Error types for the Entitlement API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use syncstyle_billing::BillingError;
use syncstyle_entitlement::EntitlementError;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Entitlement error")]
    Entitlement(#[from] EntitlementError),

    #[error("Billing error")]
    Billing(#[from] BillingError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Entitlement(e) if e.is_store_failure() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Entitlement(_) => StatusCode::BAD_REQUEST,
            Self::Billing(e) => match e {
                BillingError::UnknownTier(_) | BillingError::WebhookError(_) => {
                    StatusCode::BAD_REQUEST
                }
                BillingError::CustomerNotFound => StatusCode::NOT_FOUND,
                BillingError::ProviderError(_) => StatusCode::BAD_GATEWAY,
                BillingError::Database(_) | BillingError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Entitlement(e) if e.is_store_failure() => "STORE_UNAVAILABLE",
            Self::Entitlement(_) => "INVALID_QUANTITY",
            Self::Billing(e) => match e {
                BillingError::UnknownTier(_) => "UNKNOWN_TIER",
                BillingError::WebhookError(_) => "WEBHOOK_ERROR",
                BillingError::CustomerNotFound => "CUSTOMER_NOT_FOUND",
                BillingError::ProviderError(_) => "PAYMENT_PROVIDER_ERROR",
                BillingError::Database(_) | BillingError::Internal(_) => "INTERNAL_ERROR",
            },
        }
    }

    /// Message safe to return to the caller
    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(_) => self.to_string(),
            Self::Entitlement(e) if e.is_store_failure() => {
                "Entitlement store unavailable".to_string()
            }
            Self::Entitlement(_) => format!("Bad request: {}", self.source_message()),
            Self::Billing(
                BillingError::UnknownTier(_)
                | BillingError::WebhookError(_)
                | BillingError::CustomerNotFound,
            ) => self.source_message(),
            Self::Billing(BillingError::ProviderError(_)) => "Payment provider error".to_string(),
            Self::Billing(_) => "Internal error".to_string(),
        }
    }

    fn source_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Entitlement(e) => e.to_string(),
            Self::Billing(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server-side failures
        if status.is_server_error() {
            tracing::error!(error = ?self, "Internal API error");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.public_message(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
