//! PostgreSQL usage ledger repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use syncstyle_types::{BillingPeriod, UsageType, UserId};

use crate::error::{DbError, DbResult};
use crate::repo::UsageRepository;

/// PostgreSQL usage repository
#[derive(Clone)]
pub struct PgUsageRepository {
    pool: PgPool,
}

impl PgUsageRepository {
    /// Create a new usage repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PgUsageRepository {
    async fn sum_usage(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(usage_count), 0)::BIGINT
            FROM usage_records
            WHERE user_id = $1
              AND usage_type = $2
              AND billing_period_start < $4
              AND billing_period_end > $3
            "#,
        )
        .bind(user_id.0)
        .bind(usage_type.as_str())
        .bind(period_start)
        .bind(period_end)
        .fetch_one(&self.pool)
        .await?;

        u64::try_from(result.0).map_err(|_| DbError::OutOfRange("usage_count"))
    }

    async fn increment(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        period: &BillingPeriod,
        count: u64,
    ) -> DbResult<()> {
        let count = i64::try_from(count).map_err(|_| DbError::OutOfRange("usage_count"))?;

        sqlx::query(
            r#"
            INSERT INTO usage_records (user_id, usage_type, billing_period_start,
                                       billing_period_end, usage_count)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, usage_type, billing_period_start, billing_period_end)
            DO UPDATE SET usage_count = usage_records.usage_count + EXCLUDED.usage_count,
                          updated_at = NOW()
            "#,
        )
        .bind(user_id.0)
        .bind(usage_type.as_str())
        .bind(period.start)
        .bind(period.end)
        .bind(count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
