//! Checkout and customer portal handlers

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

use syncstyle_types::{CheckoutSession, PortalSession};

use crate::error::ApiResult;
use crate::handlers::shared::{parse_tier, parse_user_id, record_op_duration, validate_redirect_url};
use crate::state::{AppState, Backend};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    pub user_id: String,
    pub tier: String,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePortalRequest {
    pub user_id: String,
    pub return_url: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/billing/checkout
#[instrument(skip(state, req), fields(user_id = %req.user_id, tier = %req.tier))]
pub async fn create_checkout<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<CreateCheckoutRequest>,
) -> ApiResult<Json<CheckoutSession>> {
    let start = Instant::now();

    let user_id = parse_user_id(&req.user_id)?;
    let tier = parse_tier(&req.tier)?;
    validate_redirect_url(req.success_url.as_deref(), "success_url")?;
    validate_redirect_url(req.cancel_url.as_deref(), "cancel_url")?;

    let result = state
        .billing
        .create_checkout(
            user_id,
            &tier,
            req.success_url.as_deref(),
            req.cancel_url.as_deref(),
        )
        .await;
    record_op_duration("create_checkout", start, result.is_ok());

    Ok(Json(result?))
}

/// POST /api/v1/billing/portal
#[instrument(skip(state, req), fields(user_id = %req.user_id))]
pub async fn create_portal<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<CreatePortalRequest>,
) -> ApiResult<Json<PortalSession>> {
    let start = Instant::now();

    let user_id = parse_user_id(&req.user_id)?;
    validate_redirect_url(req.return_url.as_deref(), "return_url")?;

    let result = state
        .billing
        .create_portal_session(user_id, req.return_url.as_deref())
        .await;
    record_op_duration("create_portal", start, result.is_ok());

    Ok(Json(result?))
}
