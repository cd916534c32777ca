//! In-memory subscription repository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use syncstyle_types::{SubscriptionRecord, UserId};

use crate::error::DbResult;
use crate::repo::{SubscriptionRepository, UpsertSubscription};

/// In-memory subscription repository
#[derive(Default, Clone)]
pub struct MemorySubscriptionRepository {
    records: Arc<DashMap<UserId, SubscriptionRecord>>,
}

impl MemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record directly, bypassing upsert rules
    pub fn insert(&self, record: SubscriptionRecord) {
        self.records.insert(record.user_id, record);
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SubscriptionRepository for MemorySubscriptionRepository {
    async fn find_by_user_id(&self, user_id: UserId) -> DbResult<Option<SubscriptionRecord>> {
        Ok(self.records.get(&user_id).map(|r| r.value().clone()))
    }

    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> DbResult<Option<SubscriptionRecord>> {
        Ok(self
            .records
            .iter()
            .find(|r| r.stripe_customer_id.as_deref() == Some(customer_id))
            .map(|r| r.value().clone()))
    }

    async fn upsert(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRecord> {
        let now = Utc::now();
        let mut entry = self
            .records
            .entry(sub.user_id)
            .or_insert_with(|| SubscriptionRecord {
                user_id: sub.user_id,
                subscribed: false,
                tier_name: None,
                expires_at: None,
                first_subscribed_at: None,
                stripe_customer_id: None,
                stripe_subscription_id: None,
                updated_at: now,
            });

        let record = entry.value_mut();
        // A row already marked subscribed counts as the first subscription
        if record.subscribed && record.first_subscribed_at.is_none() {
            record.first_subscribed_at = Some(record.updated_at);
        }
        record.subscribed = sub.subscribed;
        record.tier_name = sub.tier_name;
        record.expires_at = sub.expires_at;
        if sub.subscribed && record.first_subscribed_at.is_none() {
            record.first_subscribed_at = Some(now);
        }
        if sub.stripe_customer_id.is_some() {
            record.stripe_customer_id = sub.stripe_customer_id;
        }
        if sub.stripe_subscription_id.is_some() {
            record.stripe_subscription_id = sub.stripe_subscription_id;
        }
        record.updated_at = now;

        Ok(record.clone())
    }
}
