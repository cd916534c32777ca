//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use syncstyle_types::{SubscriptionRecord, UserId};

use crate::error::DbResult;
use crate::models::SubscriptionRow;
use crate::repo::{SubscriptionRepository, UpsertSubscription};

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_user_id(&self, user_id: UserId) -> DbResult<Option<SubscriptionRecord>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT user_id, subscribed, tier_name, expires_at, first_subscribed_at,
                   stripe_customer_id, stripe_subscription_id, created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SubscriptionRecord::try_from).transpose()
    }

    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> DbResult<Option<SubscriptionRecord>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT user_id, subscribed, tier_name, expires_at, first_subscribed_at,
                   stripe_customer_id, stripe_subscription_id, created_at, updated_at
            FROM subscriptions
            WHERE stripe_customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SubscriptionRecord::try_from).transpose()
    }

    async fn upsert(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRecord> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (user_id, subscribed, tier_name, expires_at,
                                       first_subscribed_at, stripe_customer_id,
                                       stripe_subscription_id)
            VALUES ($1, $2, $3, $4, CASE WHEN $2 THEN NOW() END, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                subscribed = EXCLUDED.subscribed,
                tier_name = EXCLUDED.tier_name,
                expires_at = EXCLUDED.expires_at,
                first_subscribed_at = COALESCE(
                    subscriptions.first_subscribed_at,
                    CASE WHEN subscriptions.subscribed THEN subscriptions.updated_at END,
                    EXCLUDED.first_subscribed_at),
                stripe_customer_id = COALESCE(EXCLUDED.stripe_customer_id,
                                              subscriptions.stripe_customer_id),
                stripe_subscription_id = COALESCE(EXCLUDED.stripe_subscription_id,
                                                  subscriptions.stripe_subscription_id),
                updated_at = NOW()
            RETURNING user_id, subscribed, tier_name, expires_at, first_subscribed_at,
                      stripe_customer_id, stripe_subscription_id, created_at, updated_at
            "#,
        )
        .bind(sub.user_id.0)
        .bind(sub.subscribed)
        .bind(sub.tier_name.as_ref().map(|t| t.as_str()))
        .bind(sub.expires_at)
        .bind(&sub.stripe_customer_id)
        .bind(&sub.stripe_subscription_id)
        .fetch_one(&self.pool)
        .await?;

        SubscriptionRecord::try_from(row)
    }
}
