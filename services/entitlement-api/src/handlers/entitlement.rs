//! Entitlement check handlers
//!
//! The checks themselves never fail: store trouble comes back as a denial.
//! Only malformed input is an error here.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

use syncstyle_types::{FeatureCheck, UpgradeModalData, UsageLimitCheck};

use crate::error::ApiResult;
use crate::handlers::shared::{parse_feature, parse_usage_type, parse_user_id, record_op_duration};
use crate::state::{AppState, Backend};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// GET /api/v1/entitlements/features/{feature}
#[instrument(skip(state, query), fields(user_id = %query.user_id))]
pub async fn check_feature<B: Backend>(
    State(state): State<AppState<B>>,
    Path(feature): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<FeatureCheck>> {
    let start = Instant::now();

    let feature = parse_feature(&feature)?;
    let user_id = parse_user_id(&query.user_id)?;

    let allowed = state.engine.check_feature_access(user_id, feature).await;

    record_op_duration("check_feature", start, true);
    Ok(Json(FeatureCheck { feature, allowed }))
}

/// GET /api/v1/entitlements/usage/{usage_type}
#[instrument(skip(state, query), fields(user_id = %query.user_id))]
pub async fn check_usage<B: Backend>(
    State(state): State<AppState<B>>,
    Path(usage_type): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<UsageLimitCheck>> {
    let start = Instant::now();

    let usage_type = parse_usage_type(&usage_type)?;
    let user_id = parse_user_id(&query.user_id)?;

    let check = state.engine.check_usage_limit(user_id, usage_type).await;

    record_op_duration("check_usage", start, true);
    Ok(Json(UsageLimitCheck { usage_type, check }))
}

/// GET /api/v1/entitlements/upgrade/{feature}
#[instrument(skip(state, query), fields(user_id = %query.user_id))]
pub async fn upgrade_prompt<B: Backend>(
    State(state): State<AppState<B>>,
    Path(feature): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<UpgradeModalData>> {
    let start = Instant::now();

    let feature = parse_feature(&feature)?;
    let user_id = parse_user_id(&query.user_id)?;

    let data = state.engine.get_upgrade_prompt_data(user_id, feature).await;

    record_op_duration("upgrade_prompt", start, true);
    Ok(Json(data))
}
