//! Subscription record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TierName, UserId};

/// Per-user subscription state
///
/// Records are never deleted; cancellation flips `subscribed` to false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Owner of the record
    pub user_id: UserId,
    /// Subscription flag as last written by checkout or webhooks
    pub subscribed: bool,
    /// Tier catalog key, absent when unsubscribed
    pub tier_name: Option<TierName>,
    /// End of the paid period
    pub expires_at: Option<DateTime<Utc>>,
    /// First time the record was written with `subscribed = true`; never cleared
    pub first_subscribed_at: Option<DateTime<Utc>>,
    /// Stripe customer ID
    pub stripe_customer_id: Option<String>,
    /// Stripe subscription ID
    pub stripe_subscription_id: Option<String>,
    /// Last write
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Whether `expires_at` lies strictly before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// Subscribed and not expired at `now`
    pub fn is_entitled_at(&self, now: DateTime<Utc>) -> bool {
        self.subscribed && !self.is_expired_at(now)
    }

    /// Whether the user has ever held an active subscription
    pub fn has_ever_subscribed(&self) -> bool {
        self.subscribed || self.first_subscribed_at.is_some()
    }

    /// Tier to report as current, `free` when none is recorded
    pub fn current_tier(&self) -> TierName {
        self.tier_name.clone().unwrap_or_else(TierName::free)
    }
}
