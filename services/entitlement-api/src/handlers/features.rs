//! Feature catalog handler

use axum::Json;

use syncstyle_types::{feature_catalog, FeatureInfo};

/// GET /api/v1/features
pub async fn list_features() -> Json<Vec<FeatureInfo>> {
    Json(feature_catalog())
}
