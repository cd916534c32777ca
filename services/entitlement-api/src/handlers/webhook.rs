//! Stripe webhook handler

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use syncstyle_billing::BillingError;

use crate::handlers::shared::record_op_duration;
use crate::state::{AppState, Backend};

/// POST /webhooks/stripe
///
/// Handle Stripe webhook events with signature verification. Verification
/// failures are a 400; store failures are a 500 so Stripe retries.
pub async fn stripe_webhook<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let start = Instant::now();

    // Extract Stripe signature header
    let Some(sig_header) = headers.get("stripe-signature") else {
        tracing::warn!("Missing Stripe-Signature header");
        return StatusCode::BAD_REQUEST;
    };

    let Ok(signature) = sig_header.to_str() else {
        tracing::warn!("Invalid Stripe-Signature header encoding");
        return StatusCode::BAD_REQUEST;
    };

    let result = state.billing.process_webhook(&body, signature).await;
    record_op_duration("stripe_webhook", start, result.is_ok());

    match result {
        Ok(outcome) => {
            tracing::debug!(outcome = outcome.label(), "Webhook processed");
            StatusCode::OK
        }
        Err(BillingError::WebhookError(e)) => {
            tracing::warn!(error = %e, "Webhook rejected");
            StatusCode::BAD_REQUEST
        }
        Err(e) => {
            tracing::error!(error = ?e, "Webhook processing failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
