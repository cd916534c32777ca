//! Engine configuration

use std::time::Duration;

use syncstyle_types::UsageType;

/// Default per-read store timeout
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Monthly allowance for users without an active subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeTierAllowance {
    pub ai_recommendations: u64,
    pub photo_uploads: u64,
    pub outfit_generations: u64,
}

impl FreeTierAllowance {
    /// Allowance for a usage type
    pub fn limit_for(&self, usage_type: UsageType) -> u64 {
        match usage_type {
            UsageType::AiRecommendations => self.ai_recommendations,
            UsageType::PhotoUploads => self.photo_uploads,
            UsageType::OutfitGenerations => self.outfit_generations,
        }
    }
}

impl Default for FreeTierAllowance {
    fn default() -> Self {
        Self {
            ai_recommendations: 5,
            photo_uploads: 3,
            outfit_generations: 3,
        }
    }
}

/// Entitlement engine configuration
#[derive(Debug, Clone)]
pub struct EntitlementConfig {
    /// Upper bound on each individual store read
    pub store_timeout: Duration,
    /// Free-tier monthly allowance
    pub free_allowance: FreeTierAllowance,
}

impl EntitlementConfig {
    /// Set the per-read store timeout
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Set the free-tier allowance
    pub fn with_free_allowance(mut self, allowance: FreeTierAllowance) -> Self {
        self.free_allowance = allowance;
        self
    }
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
            free_allowance: FreeTierAllowance::default(),
        }
    }
}
