//! Catalog and subscription fixtures

use std::sync::Arc;

use chrono::{DateTime, Utc};

use syncstyle_db::{MemoryRepositories, SubscriptionRepository, TierRepository, UsageRepository};
use syncstyle_entitlement::{EntitlementConfig, EntitlementEngine, MemoryEntitlementEngine};
use syncstyle_types::{
    Feature, SubscriptionRecord, Tier, TierLimits, TierName, UsageLimit, UsageType, UserId,
};

/// Build a tier from raw limits (`-1` = unlimited)
pub fn tier(name: &str, price_monthly_cents: i64, features: &[Feature], limits: &[(UsageType, i64)]) -> Tier {
    let limits = limits.iter().fold(TierLimits::new(), |acc, (usage_type, raw)| {
        acc.with(*usage_type, UsageLimit::from_raw(*raw).unwrap())
    });

    Tier {
        name: TierName::new(name).unwrap(),
        price_monthly_cents,
        price_yearly_cents: price_monthly_cents * 10,
        features: features.iter().copied().collect(),
        limits,
        is_active: true,
    }
}

/// The default pro / premium / enterprise catalog
pub fn default_catalog() -> Vec<Tier> {
    use Feature::*;
    use UsageType::*;

    vec![
        tier(
            "pro",
            499,
            &[AiOutfitSuggestions, WeatherIntegration, UnlimitedWardrobe],
            &[(AiRecommendations, 50), (PhotoUploads, 100), (OutfitGenerations, 50)],
        ),
        tier(
            "premium",
            999,
            &[
                AiOutfitSuggestions,
                WeatherIntegration,
                UnlimitedWardrobe,
                AdvancedAnalytics,
                CarbonFootprintTracking,
                MarketplaceAccess,
            ],
            &[(AiRecommendations, 200), (PhotoUploads, -1), (OutfitGenerations, 200)],
        ),
        tier(
            "enterprise",
            2999,
            &Feature::ALL,
            &[(AiRecommendations, -1), (PhotoUploads, -1), (OutfitGenerations, -1)],
        ),
    ]
}

/// In-memory stores seeded with the default catalog
pub fn seeded_repos() -> MemoryRepositories {
    let repos = MemoryRepositories::new();
    for tier in default_catalog() {
        repos.tiers.insert(tier);
    }
    repos
}

/// Engine over in-memory stores
pub fn memory_engine(repos: &MemoryRepositories) -> MemoryEntitlementEngine {
    engine_over(
        repos.subscriptions.clone(),
        repos.tiers.clone(),
        repos.usage.clone(),
        EntitlementConfig::default(),
    )
}

/// Engine over arbitrary stores
pub fn engine_over<S, T, U>(
    subscriptions: S,
    tiers: T,
    usage: U,
    config: EntitlementConfig,
) -> EntitlementEngine<S, T, U>
where
    S: SubscriptionRepository,
    T: TierRepository,
    U: UsageRepository,
{
    EntitlementEngine::new(Arc::new(subscriptions), Arc::new(tiers), Arc::new(usage), config)
}

/// Subscription record for a tier
pub fn subscription(
    user_id: UserId,
    subscribed: bool,
    tier: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
) -> SubscriptionRecord {
    SubscriptionRecord {
        user_id,
        subscribed,
        tier_name: tier.map(|t| TierName::new(t).unwrap()),
        expires_at,
        first_subscribed_at: subscribed.then(Utc::now),
        stripe_customer_id: None,
        stripe_subscription_id: None,
        updated_at: Utc::now(),
    }
}
