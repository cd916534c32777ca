//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.
//! Every row is converted into its domain type through `TryFrom`, which is
//! where malformed rows are rejected.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use syncstyle_types::{
    Feature, SubscriptionRecord, Tier, TierLimits, TierName, UsageLimit, UsageType, UserId,
};

use crate::error::DbError;

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub user_id: Uuid,
    pub subscribed: bool,
    pub tier_name: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub first_subscribed_at: Option<DateTime<Utc>>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tier catalog row from the database
#[derive(Debug, Clone, FromRow)]
pub struct TierRow {
    pub tier_name: String,
    pub price_monthly_cents: i64,
    pub price_yearly_cents: i64,
    pub features: Json<Value>,
    pub limits: Json<Value>,
    pub is_active: bool,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = DbError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let tier_name = row
            .tier_name
            .map(TierName::new)
            .transpose()
            .map_err(|e| DbError::malformed("subscriptions", row.user_id.to_string(), e.to_string()))?;

        Ok(Self {
            user_id: UserId(row.user_id),
            subscribed: row.subscribed,
            tier_name,
            expires_at: row.expires_at,
            first_subscribed_at: row.first_subscribed_at,
            stripe_customer_id: row.stripe_customer_id,
            stripe_subscription_id: row.stripe_subscription_id,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<TierRow> for Tier {
    type Error = DbError;

    fn try_from(row: TierRow) -> Result<Self, Self::Error> {
        let key = row.tier_name.clone();
        let malformed = |reason: String| DbError::malformed("tiers", key.clone(), reason);

        let name = TierName::new(row.tier_name).map_err(|e| malformed(e.to_string()))?;

        if row.price_monthly_cents < 0 || row.price_yearly_cents < 0 {
            return Err(malformed("negative price".to_string()));
        }

        let features = parse_features(&row.features.0).map_err(malformed)?;
        let limits = parse_limits(&row.limits.0).map_err(malformed)?;

        Ok(Self {
            name,
            price_monthly_cents: row.price_monthly_cents,
            price_yearly_cents: row.price_yearly_cents,
            features,
            limits,
            is_active: row.is_active,
        })
    }
}

/// Parse the `features` column: a JSON array of known feature identifiers.
pub fn parse_features(value: &Value) -> Result<BTreeSet<Feature>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| "features must be an array".to_string())?;

    items
        .iter()
        .map(|item| {
            let id = item
                .as_str()
                .ok_or_else(|| format!("feature entry is not a string: {item}"))?;
            id.parse::<Feature>().map_err(|e| e.to_string())
        })
        .collect()
}

/// Parse the `limits` column: a JSON object of `<usage_type>_per_month` keys to
/// integer caps, `-1` meaning unlimited.
///
/// Keys that do not name a metered usage type are ignored; the column also
/// carries caps owned by other subsystems.
pub fn parse_limits(value: &Value) -> Result<TierLimits, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "limits must be an object".to_string())?;

    let mut limits = TierLimits::new();
    for (key, raw) in object {
        let Some(usage_type) = UsageType::from_limit_key(key) else {
            continue;
        };
        let raw = raw
            .as_i64()
            .ok_or_else(|| format!("limit {key} is not an integer: {raw}"))?;
        let limit = UsageLimit::from_raw(raw).map_err(|e| format!("limit {key}: {e}"))?;
        limits.insert(usage_type, limit);
    }

    Ok(limits)
}

/// Render a feature set for the `features` column
pub fn features_to_json(features: &BTreeSet<Feature>) -> Value {
    Value::Array(
        features
            .iter()
            .map(|f| Value::String(f.as_str().to_string()))
            .collect(),
    )
}
