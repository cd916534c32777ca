//! In-memory usage ledger

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use syncstyle_types::{BillingPeriod, UsageType, UserId};

use crate::error::{DbError, DbResult};
use crate::repo::UsageRepository;

type UsageKey = (UserId, UsageType, DateTime<Utc>, DateTime<Utc>);

/// In-memory usage ledger keyed like the `usage_records` unique constraint
#[derive(Default, Clone)]
pub struct MemoryUsageRepository {
    counters: Arc<DashMap<UsageKey, u64>>,
}

impl MemoryUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a counter for an arbitrary `[start, end)` window
    pub fn set(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        count: u64,
    ) {
        self.counters.insert((user_id, usage_type, start, end), count);
    }
}

#[async_trait]
impl UsageRepository for MemoryUsageRepository {
    async fn sum_usage(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> DbResult<u64> {
        let period = BillingPeriod {
            start: period_start,
            end: period_end,
        };
        self.counters
            .iter()
            .filter(|entry| {
                let (user, kind, start, end) = *entry.key();
                user == user_id && kind == usage_type && period.overlaps(start, end)
            })
            .try_fold(0u64, |total, entry| {
                total
                    .checked_add(*entry.value())
                    .ok_or(DbError::OutOfRange("usage_count"))
            })
    }

    async fn increment(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        period: &BillingPeriod,
        count: u64,
    ) -> DbResult<()> {
        let mut counter = self
            .counters
            .entry((user_id, usage_type, period.start, period.end))
            .or_insert(0);
        *counter = counter
            .checked_add(count)
            .ok_or(DbError::OutOfRange("usage_count"))?;
        Ok(())
    }
}
