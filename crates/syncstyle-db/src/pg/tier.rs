//! PostgreSQL tier catalog repository implementation

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::warn;

use syncstyle_types::{Tier, TierName};

use crate::error::DbResult;
use crate::models::{features_to_json, TierRow};
use crate::repo::TierRepository;

/// PostgreSQL tier catalog repository
#[derive(Clone)]
pub struct PgTierRepository {
    pool: PgPool,
}

impl PgTierRepository {
    /// Create a new tier repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TierRepository for PgTierRepository {
    async fn find_active(&self, name: &TierName) -> DbResult<Option<Tier>> {
        let row = sqlx::query_as::<_, TierRow>(
            r#"
            SELECT tier_name, price_monthly_cents, price_yearly_cents, features, limits, is_active
            FROM tiers
            WHERE tier_name = $1 AND is_active = TRUE
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Tier::try_from).transpose()
    }

    async fn list_active(&self) -> DbResult<Vec<Tier>> {
        let rows = sqlx::query_as::<_, TierRow>(
            r#"
            SELECT tier_name, price_monthly_cents, price_yearly_cents, features, limits, is_active
            FROM tiers
            WHERE is_active = TRUE
            ORDER BY price_monthly_cents ASC, tier_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // A malformed row is left out of the listing rather than failing it.
        let tiers = rows
            .into_iter()
            .filter_map(|row| match Tier::try_from(row) {
                Ok(tier) => Some(tier),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed tier row");
                    None
                }
            })
            .collect();

        Ok(tiers)
    }

    async fn upsert(&self, tier: &Tier) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tiers (tier_name, price_monthly_cents, price_yearly_cents,
                               features, limits, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tier_name) DO UPDATE SET
                price_monthly_cents = EXCLUDED.price_monthly_cents,
                price_yearly_cents = EXCLUDED.price_yearly_cents,
                features = EXCLUDED.features,
                limits = EXCLUDED.limits,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            "#,
        )
        .bind(tier.name.as_str())
        .bind(tier.price_monthly_cents)
        .bind(tier.price_yearly_cents)
        .bind(Json(features_to_json(&tier.features)))
        .bind(Json(tier.limits.to_json()))
        .bind(tier.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
