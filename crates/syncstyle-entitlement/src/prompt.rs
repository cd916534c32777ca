//! Upgrade prompt data

use std::time::Instant;

use metrics::histogram;
use tracing::{instrument, warn};

use syncstyle_db::{SubscriptionRepository, TierRepository, UsageRepository};
use syncstyle_types::{Feature, Tier, TierName, TierSummary, UpgradeModalData, UserId};

use crate::EntitlementEngine;

impl<S, T, U> EntitlementEngine<S, T, U>
where
    S: SubscriptionRepository,
    T: TierRepository,
    U: UsageRepository,
{
    /// Build the upgrade call-to-action for a feature
    ///
    /// The subscription record and the tier catalog are read concurrently.
    /// A failed subscription read reports `free` with no trial; a failed
    /// catalog read omits the recommendation.
    #[instrument(skip_all, fields(user_id = %user_id, feature = %feature))]
    pub async fn get_upgrade_prompt_data(
        &self,
        user_id: UserId,
        feature: Feature,
    ) -> UpgradeModalData {
        let started = Instant::now();
        let (record, tiers) = tokio::join!(self.subscription(user_id), self.active_tiers());

        let mut degraded = false;

        let (current_tier, trial_available) = match record {
            Ok(Some(record)) => (record.current_tier(), !record.has_ever_subscribed()),
            Ok(None) => (TierName::free(), true),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    feature = %feature,
                    error = %e,
                    "Subscription read failed, prompting as free tier without trial"
                );
                degraded = true;
                (TierName::free(), false)
            }
        };

        let recommended_tier = match tiers {
            Ok(tiers) => recommend_tier(&tiers, feature),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    feature = %feature,
                    error = %e,
                    "Tier catalog read failed, omitting recommendation"
                );
                degraded = true;
                None
            }
        };

        histogram!(
            "entitlement_operation_duration_seconds",
            "operation" => "upgrade_prompt",
            "result" => if degraded { "degraded" } else { "ok" }
        )
        .record(started.elapsed().as_secs_f64());

        UpgradeModalData {
            feature,
            feature_name: feature.display_name().to_string(),
            benefits: feature.benefits().iter().map(|b| b.to_string()).collect(),
            current_tier,
            recommended_tier,
            trial_available,
        }
    }
}

/// Cheapest active tier granting `feature`, ties broken by name
pub fn recommend_tier(tiers: &[Tier], feature: Feature) -> Option<TierSummary> {
    tiers
        .iter()
        .filter(|tier| tier.is_active && tier.includes(feature))
        .min_by(|a, b| {
            a.price_monthly_cents
                .cmp(&b.price_monthly_cents)
                .then_with(|| a.name.cmp(&b.name))
        })
        .map(Tier::summary)
}
