//! Billing configuration

use std::collections::HashMap;
use std::time::Duration;

use syncstyle_types::TierName;

/// Stripe REST API base URL
pub const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Maximum accepted age of a webhook signature timestamp
pub const DEFAULT_WEBHOOK_TOLERANCE: Duration = Duration::from_secs(300);

/// Billing service configuration
#[derive(Clone)]
pub struct BillingConfig {
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe price ID per tier
    pub price_ids: HashMap<TierName, String>,
    /// Default success URL for checkout
    pub default_success_url: String,
    /// Default cancel URL for checkout
    pub default_cancel_url: String,
    /// Default return URL for the customer portal
    pub default_portal_return_url: String,
    /// Stripe API base URL
    pub api_base: String,
    /// Webhook timestamp tolerance
    pub webhook_tolerance: Duration,
}

impl BillingConfig {
    /// Create a new billing config
    pub fn new(
        stripe_secret_key: impl Into<String>,
        stripe_webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            stripe_secret_key: stripe_secret_key.into(),
            stripe_webhook_secret: stripe_webhook_secret.into(),
            price_ids: HashMap::new(),
            default_success_url: "https://app.syncstyle.com/billing/success".to_string(),
            default_cancel_url: "https://app.syncstyle.com/billing/cancel".to_string(),
            default_portal_return_url: "https://app.syncstyle.com/settings/billing".to_string(),
            api_base: STRIPE_API_BASE.to_string(),
            webhook_tolerance: DEFAULT_WEBHOOK_TOLERANCE,
        }
    }

    /// Set price ID for a tier
    pub fn with_price(mut self, tier: TierName, price_id: impl Into<String>) -> Self {
        self.price_ids.insert(tier, price_id.into());
        self
    }

    /// Set default checkout URLs
    pub fn with_urls(
        mut self,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        self.default_success_url = success_url.into();
        self.default_cancel_url = cancel_url.into();
        self
    }

    /// Set default portal return URL
    pub fn with_portal_return_url(mut self, url: impl Into<String>) -> Self {
        self.default_portal_return_url = url.into();
        self
    }

    /// Point the provider at another API base (tests, proxies)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set webhook timestamp tolerance
    pub fn with_webhook_tolerance(mut self, tolerance: Duration) -> Self {
        self.webhook_tolerance = tolerance;
        self
    }

    /// Price ID for a tier
    pub fn price_for(&self, tier: &TierName) -> Option<&str> {
        self.price_ids.get(tier).map(String::as_str)
    }

    /// Tier sold under a price ID
    pub fn tier_for_price(&self, price_id: &str) -> Option<&TierName> {
        self.price_ids
            .iter()
            .find(|(_, id)| id.as_str() == price_id)
            .map(|(tier, _)| tier)
    }
}

impl std::fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingConfig")
            .field("stripe_secret_key", &"[redacted]")
            .field("stripe_webhook_secret", &"[redacted]")
            .field("price_ids", &self.price_ids)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}
