//! Feature access and usage limit checks

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use tracing::{error, instrument, warn};

use syncstyle_db::memory::{MemorySubscriptionRepository, MemoryTierRepository, MemoryUsageRepository};
use syncstyle_db::pg::{PgSubscriptionRepository, PgTierRepository, PgUsageRepository};
use syncstyle_db::{SubscriptionRepository, TierRepository, UsageRepository};
use syncstyle_types::{
    BillingPeriod, Feature, SubscriptionRecord, Tier, TierName, UsageCheck, UsageLimit, UsageType,
    UserId,
};

use crate::store::{self, timed};
use crate::{EntitlementConfig, EntitlementError};

/// Engine backed by PostgreSQL stores
pub type PgEntitlementEngine =
    EntitlementEngine<PgSubscriptionRepository, PgTierRepository, PgUsageRepository>;

/// Engine backed by in-memory stores
pub type MemoryEntitlementEngine =
    EntitlementEngine<MemorySubscriptionRepository, MemoryTierRepository, MemoryUsageRepository>;

/// Fail-closed entitlement engine
///
/// Holds only store handles and immutable configuration. Construct once and
/// share behind an `Arc` or clone it; clones share the same stores.
pub struct EntitlementEngine<S, T, U> {
    pub(crate) subscriptions: Arc<S>,
    pub(crate) tiers: Arc<T>,
    pub(crate) usage: Arc<U>,
    pub(crate) config: EntitlementConfig,
}

impl<S, T, U> EntitlementEngine<S, T, U>
where
    S: SubscriptionRepository,
    T: TierRepository,
    U: UsageRepository,
{
    /// Create a new engine
    pub fn new(
        subscriptions: Arc<S>,
        tiers: Arc<T>,
        usage: Arc<U>,
        config: EntitlementConfig,
    ) -> Self {
        Self {
            subscriptions,
            tiers,
            usage,
            config,
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EntitlementConfig {
        &self.config
    }

    /// Whether the user may use a premium feature right now
    pub async fn check_feature_access(&self, user_id: UserId, feature: Feature) -> bool {
        self.check_feature_access_at(user_id, feature, Utc::now()).await
    }

    /// Feature access as of `now`
    ///
    /// Denies on a missing, unsubscribed or expired record, on a missing or
    /// inactive tier, and on any store failure.
    #[instrument(skip_all, fields(user_id = %user_id, feature = %feature))]
    pub async fn check_feature_access_at(
        &self,
        user_id: UserId,
        feature: Feature,
        now: DateTime<Utc>,
    ) -> bool {
        let started = Instant::now();

        let (allowed, outcome) = match self.feature_access(user_id, feature, now).await {
            Ok(allowed) => (allowed, if allowed { "allowed" } else { "denied" }),
            Err(e) => {
                error!(
                    user_id = %user_id,
                    feature = %feature,
                    error = %e,
                    "Feature access check failed, denying"
                );
                (false, "error")
            }
        };

        record_check("feature", outcome, started);
        allowed
    }

    /// Remaining monthly quota for a metered action right now
    pub async fn check_usage_limit(&self, user_id: UserId, usage_type: UsageType) -> UsageCheck {
        self.check_usage_limit_at(user_id, usage_type, Utc::now())
            .await
    }

    /// Usage limit as of `now`, aggregated over the calendar month containing it
    ///
    /// Users without an active subscription get the free allowance. Any failure
    /// yields `{ allowed: false, remaining: 0 }`.
    #[instrument(skip_all, fields(user_id = %user_id, usage_type = %usage_type))]
    pub async fn check_usage_limit_at(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        now: DateTime<Utc>,
    ) -> UsageCheck {
        let started = Instant::now();

        let (check, outcome) = match self.usage_limit(user_id, usage_type, now).await {
            Ok(check) => (check, if check.allowed { "allowed" } else { "denied" }),
            Err(e) => {
                error!(
                    user_id = %user_id,
                    usage_type = %usage_type,
                    error = %e,
                    "Usage limit check failed, denying"
                );
                (UsageCheck::denied(), "error")
            }
        };

        record_check("usage", outcome, started);
        check
    }

    async fn feature_access(
        &self,
        user_id: UserId,
        feature: Feature,
        now: DateTime<Utc>,
    ) -> Result<bool, EntitlementError> {
        let Some(record) = self.subscription(user_id).await? else {
            return Ok(false);
        };
        if !record.is_entitled_at(now) {
            return Ok(false);
        }

        match self.subscribed_tier(&record).await? {
            Some(tier) => Ok(tier.includes(feature)),
            None => Ok(false),
        }
    }

    async fn usage_limit(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        now: DateTime<Utc>,
    ) -> Result<UsageCheck, EntitlementError> {
        let record = self
            .subscription(user_id)
            .await?
            .filter(|record| record.is_entitled_at(now));

        let limit = match record {
            None => UsageLimit::Capped(self.config.free_allowance.limit_for(usage_type)),
            Some(record) => {
                let Some(tier) = self.subscribed_tier(&record).await? else {
                    return Ok(UsageCheck::denied());
                };
                match tier.limit_for(usage_type) {
                    Some(limit) => limit,
                    None => {
                        warn!(
                            user_id = %user_id,
                            tier = %tier.name,
                            usage_type = %usage_type,
                            "Tier has no limit for usage type, denying"
                        );
                        return Ok(UsageCheck::denied());
                    }
                }
            }
        };

        match limit {
            UsageLimit::Unlimited => Ok(UsageCheck::unlimited()),
            UsageLimit::Capped(limit) => {
                let period = BillingPeriod::containing(now);
                let used = timed(
                    store::USAGE,
                    self.config.store_timeout,
                    self.usage
                        .sum_usage(user_id, usage_type, period.start, period.end),
                )
                .await?;
                Ok(UsageCheck::capped(limit, used))
            }
        }
    }

    pub(crate) async fn subscription(
        &self,
        user_id: UserId,
    ) -> Result<Option<SubscriptionRecord>, EntitlementError> {
        timed(
            store::SUBSCRIPTIONS,
            self.config.store_timeout,
            self.subscriptions.find_by_user_id(user_id),
        )
        .await
    }

    pub(crate) async fn active_tiers(&self) -> Result<Vec<Tier>, EntitlementError> {
        timed(
            store::TIERS,
            self.config.store_timeout,
            self.tiers.list_active(),
        )
        .await
    }

    /// Active catalog tier of a subscribed record, `None` when there is none
    async fn subscribed_tier(
        &self,
        record: &SubscriptionRecord,
    ) -> Result<Option<Tier>, EntitlementError> {
        let Some(tier_name) = record.tier_name.as_ref() else {
            warn!(user_id = %record.user_id, "Subscribed record has no tier, denying");
            return Ok(None);
        };

        let tier = self.active_tier(tier_name).await?;
        if tier.is_none() {
            warn!(
                user_id = %record.user_id,
                tier = %tier_name,
                "Subscribed tier is missing or inactive, denying"
            );
        }
        Ok(tier)
    }

    async fn active_tier(&self, name: &TierName) -> Result<Option<Tier>, EntitlementError> {
        timed(
            store::TIERS,
            self.config.store_timeout,
            self.tiers.find_active(name),
        )
        .await
    }
}

impl<S, T, U> Clone for EntitlementEngine<S, T, U> {
    fn clone(&self) -> Self {
        Self {
            subscriptions: Arc::clone(&self.subscriptions),
            tiers: Arc::clone(&self.tiers),
            usage: Arc::clone(&self.usage),
            config: self.config.clone(),
        }
    }
}

impl<S, T, U> std::fmt::Debug for EntitlementEngine<S, T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementEngine")
            .field("config", &self.config)
            .finish()
    }
}

fn record_check(check: &'static str, outcome: &'static str, started: Instant) {
    counter!("entitlement_checks_total", "check" => check, "result" => outcome).increment(1);
    histogram!(
        "entitlement_operation_duration_seconds",
        "operation" => check,
        "result" => outcome
    )
    .record(started.elapsed().as_secs_f64());
}
