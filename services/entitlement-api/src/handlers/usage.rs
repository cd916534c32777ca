//! Usage recording handler

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use syncstyle_types::UsageType;

use crate::error::ApiResult;
use crate::handlers::shared::{parse_usage_type, parse_user_id, record_op_duration};
use crate::state::{AppState, Backend};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecordUsageRequest {
    pub user_id: String,
    pub usage_type: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct RecordUsageResponse {
    pub usage_type: UsageType,
    pub total_usage: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/usage/record
#[instrument(skip(state, req), fields(user_id = %req.user_id, usage_type = %req.usage_type, quantity = req.quantity))]
pub async fn record_usage<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<RecordUsageRequest>,
) -> ApiResult<Json<RecordUsageResponse>> {
    let start = Instant::now();

    let user_id = parse_user_id(&req.user_id)?;
    let usage_type = parse_usage_type(&req.usage_type)?;

    let result = state
        .recorder
        .record_usage(user_id, usage_type, req.quantity)
        .await;
    record_op_duration("record_usage", start, result.is_ok());

    Ok(Json(RecordUsageResponse {
        usage_type,
        total_usage: result?,
    }))
}
