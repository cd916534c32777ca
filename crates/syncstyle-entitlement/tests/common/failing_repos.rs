//! Store doubles that fail or stall

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use syncstyle_db::{
    DbError, DbResult, SubscriptionRepository, TierRepository, UpsertSubscription,
    UsageRepository,
};
use syncstyle_types::{BillingPeriod, SubscriptionRecord, Tier, TierName, UsageType, UserId};

fn unavailable() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

/// Store whose every call fails
#[derive(Default, Clone)]
pub struct FailingStore;

#[async_trait]
impl SubscriptionRepository for FailingStore {
    async fn find_by_user_id(&self, _: UserId) -> DbResult<Option<SubscriptionRecord>> {
        Err(unavailable())
    }

    async fn find_by_stripe_customer_id(&self, _: &str) -> DbResult<Option<SubscriptionRecord>> {
        Err(unavailable())
    }

    async fn upsert(&self, _: UpsertSubscription) -> DbResult<SubscriptionRecord> {
        Err(unavailable())
    }
}

#[async_trait]
impl TierRepository for FailingStore {
    async fn find_active(&self, _: &TierName) -> DbResult<Option<Tier>> {
        Err(unavailable())
    }

    async fn list_active(&self) -> DbResult<Vec<Tier>> {
        Err(unavailable())
    }

    async fn upsert(&self, _: &Tier) -> DbResult<()> {
        Err(unavailable())
    }
}

#[async_trait]
impl UsageRepository for FailingStore {
    async fn sum_usage(
        &self,
        _: UserId,
        _: UsageType,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
    ) -> DbResult<u64> {
        Err(unavailable())
    }

    async fn increment(&self, _: UserId, _: UsageType, _: &BillingPeriod, _: u64) -> DbResult<()> {
        Err(unavailable())
    }
}

/// Wraps a store and delays every read
#[derive(Clone)]
pub struct SlowStore<R> {
    inner: R,
    delay: Duration,
}

impl<R> SlowStore<R> {
    pub fn new(inner: R, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<R: SubscriptionRepository> SubscriptionRepository for SlowStore<R> {
    async fn find_by_user_id(&self, user_id: UserId) -> DbResult<Option<SubscriptionRecord>> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_by_user_id(user_id).await
    }

    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> DbResult<Option<SubscriptionRecord>> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_by_stripe_customer_id(customer_id).await
    }

    async fn upsert(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRecord> {
        self.inner.upsert(sub).await
    }
}

#[async_trait]
impl<R: TierRepository> TierRepository for SlowStore<R> {
    async fn find_active(&self, name: &TierName) -> DbResult<Option<Tier>> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_active(name).await
    }

    async fn list_active(&self) -> DbResult<Vec<Tier>> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_active().await
    }

    async fn upsert(&self, tier: &Tier) -> DbResult<()> {
        self.inner.upsert(tier).await
    }
}

#[async_trait]
impl<R: UsageRepository> UsageRepository for SlowStore<R> {
    async fn sum_usage(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> DbResult<u64> {
        tokio::time::sleep(self.delay).await;
        self.inner
            .sum_usage(user_id, usage_type, period_start, period_end)
            .await
    }

    async fn increment(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        period: &BillingPeriod,
        count: u64,
    ) -> DbResult<()> {
        self.inner.increment(user_id, usage_type, period, count).await
    }
}
