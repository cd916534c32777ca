//! Repository traits
//!
//! Define async repository interfaces for the entitlement stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use syncstyle_types::{BillingPeriod, SubscriptionRecord, Tier, TierName, UsageType, UserId};

use crate::error::DbResult;

/// Subscription record store
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find the subscription record for a user
    async fn find_by_user_id(&self, user_id: UserId) -> DbResult<Option<SubscriptionRecord>>;

    /// Find a subscription record by Stripe customer ID
    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> DbResult<Option<SubscriptionRecord>>;

    /// Create or update the record for a user
    ///
    /// `first_subscribed_at` is set on the first write with `subscribed = true`
    /// and kept from then on. Stripe IDs left as `None` keep their stored value.
    async fn upsert(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRecord>;
}

/// Create or update subscription input
#[derive(Debug, Clone)]
pub struct UpsertSubscription {
    pub user_id: UserId,
    pub subscribed: bool,
    pub tier_name: Option<TierName>,
    pub expires_at: Option<DateTime<Utc>>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

impl UpsertSubscription {
    /// Input that rewrites the subscription state of an existing record
    pub fn from_record(record: &SubscriptionRecord) -> Self {
        Self {
            user_id: record.user_id,
            subscribed: record.subscribed,
            tier_name: record.tier_name.clone(),
            expires_at: record.expires_at,
            stripe_customer_id: None,
            stripe_subscription_id: None,
        }
    }
}

/// Tier catalog store
#[async_trait]
pub trait TierRepository: Send + Sync {
    /// Find an active tier by name
    async fn find_active(&self, name: &TierName) -> DbResult<Option<Tier>>;

    /// All active tiers, ordered by monthly price then name
    async fn list_active(&self) -> DbResult<Vec<Tier>>;

    /// Create or replace a catalog entry
    async fn upsert(&self, tier: &Tier) -> DbResult<()>;
}

/// Usage ledger store
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Sum usage over every record whose period overlaps `[period_start, period_end)`
    async fn sum_usage(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> DbResult<u64>;

    /// Atomically add `count` to the counter for a billing period (upsert)
    async fn increment(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        period: &BillingPeriod,
        count: u64,
    ) -> DbResult<()>;
}
