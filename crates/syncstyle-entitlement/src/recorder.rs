//! Usage recording
//!
//! The engine only reads the ledger. Callers record consumption here after
//! the gated action has happened.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use tracing::{debug, instrument};

use syncstyle_db::memory::MemoryUsageRepository;
use syncstyle_db::pg::PgUsageRepository;
use syncstyle_db::UsageRepository;
use syncstyle_types::{BillingPeriod, UsageType, UserId};

use crate::store::{self, timed};
use crate::{EntitlementConfig, EntitlementError};

/// Recorder backed by PostgreSQL
pub type PgUsageRecorder = UsageRecorder<PgUsageRepository>;

/// Recorder backed by the in-memory ledger
pub type MemoryUsageRecorder = UsageRecorder<MemoryUsageRepository>;

/// Appends consumption to the usage ledger
pub struct UsageRecorder<U> {
    usage: Arc<U>,
    config: EntitlementConfig,
}

impl<U: UsageRepository> UsageRecorder<U> {
    /// Create a new recorder
    pub fn new(usage: Arc<U>, config: EntitlementConfig) -> Self {
        Self { usage, config }
    }

    /// Record `quantity` units for the current calendar month
    ///
    /// Returns the total for the month after the increment.
    pub async fn record_usage(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        quantity: i64,
    ) -> Result<u64, EntitlementError> {
        self.record_usage_at(user_id, usage_type, quantity, Utc::now())
            .await
    }

    /// Record `quantity` units for the calendar month containing `now`
    #[instrument(skip_all, fields(user_id = %user_id, usage_type = %usage_type, quantity = quantity))]
    pub async fn record_usage_at(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<u64, EntitlementError> {
        let started = Instant::now();

        let count = u64::try_from(quantity)
            .ok()
            .filter(|count| *count > 0)
            .ok_or(EntitlementError::InvalidQuantity(quantity))?;

        let result = self.increment(user_id, usage_type, count, now).await;

        histogram!(
            "entitlement_operation_duration_seconds",
            "operation" => "record_usage",
            "result" => if result.is_ok() { "ok" } else { "error" }
        )
        .record(started.elapsed().as_secs_f64());

        result
    }

    async fn increment(
        &self,
        user_id: UserId,
        usage_type: UsageType,
        count: u64,
        now: DateTime<Utc>,
    ) -> Result<u64, EntitlementError> {
        let period = BillingPeriod::containing(now);
        let timeout = self.config.store_timeout;

        timed(
            store::USAGE,
            timeout,
            self.usage.increment(user_id, usage_type, &period, count),
        )
        .await?;

        counter!("entitlement_usage_recorded_total", "usage_type" => usage_type.as_str())
            .increment(count);

        let total = timed(
            store::USAGE,
            timeout,
            self.usage
                .sum_usage(user_id, usage_type, period.start, period.end),
        )
        .await?;

        debug!(period = %period, total, "Usage recorded");
        Ok(total)
    }
}

impl<U> Clone for UsageRecorder<U> {
    fn clone(&self) -> Self {
        Self {
            usage: Arc::clone(&self.usage),
            config: self.config.clone(),
        }
    }
}

impl<U> std::fmt::Debug for UsageRecorder<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageRecorder").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn recorder() -> MemoryUsageRecorder {
        UsageRecorder::new(
            Arc::new(MemoryUsageRepository::new()),
            EntitlementConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_record_returns_running_total() {
        let recorder = recorder();
        let user = UserId::new();

        assert_eq!(recorder.record_usage(user, UsageType::PhotoUploads, 1).await.unwrap(), 1);
        assert_eq!(recorder.record_usage(user, UsageType::PhotoUploads, 2).await.unwrap(), 3);
        assert_eq!(
            recorder.record_usage(user, UsageType::AiRecommendations, 1).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_non_positive_quantity_is_rejected() {
        let recorder = recorder();
        let user = UserId::new();

        for quantity in [0, -1, i64::MIN] {
            let err = recorder
                .record_usage(user, UsageType::PhotoUploads, quantity)
                .await
                .unwrap_err();
            assert!(matches!(err, EntitlementError::InvalidQuantity(q) if q == quantity));
            assert!(!err.is_store_failure());
        }
    }

    #[tokio::test]
    async fn test_new_month_starts_from_zero() {
        let recorder = recorder();
        let user = UserId::new();
        let january = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let february = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        let jan_total = recorder
            .record_usage_at(user, UsageType::OutfitGenerations, 4, january)
            .await
            .unwrap();
        let feb_total = recorder
            .record_usage_at(user, UsageType::OutfitGenerations, 1, february)
            .await
            .unwrap();

        assert_eq!(jan_total, 4);
        assert_eq!(feb_total, 1);
    }
}
