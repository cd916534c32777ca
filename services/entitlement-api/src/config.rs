//! Configuration for the Entitlement API service.

use std::collections::HashMap;
use std::time::Duration;

use syncstyle_billing::BillingConfig;
use syncstyle_entitlement::{EntitlementConfig, FreeTierAllowance};
use syncstyle_types::TierName;

/// Prefix of the per-tier Stripe price variables, e.g. `STRIPE_PRICE_PRO`
const PRICE_VAR_PREFIX: &str = "STRIPE_PRICE_";

/// Entitlement API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
    /// Entitlement engine configuration
    pub entitlement: EntitlementConfig,
    /// Billing configuration
    pub billing: BillingConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load configuration from a variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(String::as_str);

        // Database
        let database_url = get("DATABASE_URL")
            .ok_or(ConfigError::Missing("DATABASE_URL"))?
            .to_string();

        let http_port = parse_or("HTTP_PORT", get("HTTP_PORT"), 8080)?;
        let run_migrations = get("RUN_MIGRATIONS").map_or(true, |v| v.parse().unwrap_or(true));

        // Engine
        let store_timeout_ms: u64 = parse_or("STORE_TIMEOUT_MS", get("STORE_TIMEOUT_MS"), 2000)?;
        let defaults = FreeTierAllowance::default();
        let free_allowance = FreeTierAllowance {
            ai_recommendations: parse_or(
                "FREE_AI_RECOMMENDATIONS",
                get("FREE_AI_RECOMMENDATIONS"),
                defaults.ai_recommendations,
            )?,
            photo_uploads: parse_or(
                "FREE_PHOTO_UPLOADS",
                get("FREE_PHOTO_UPLOADS"),
                defaults.photo_uploads,
            )?,
            outfit_generations: parse_or(
                "FREE_OUTFIT_GENERATIONS",
                get("FREE_OUTFIT_GENERATIONS"),
                defaults.outfit_generations,
            )?,
        };
        let entitlement = EntitlementConfig::default()
            .with_store_timeout(Duration::from_millis(store_timeout_ms))
            .with_free_allowance(free_allowance);

        // Stripe
        let stripe_secret_key =
            get("STRIPE_SECRET_KEY").ok_or(ConfigError::Missing("STRIPE_SECRET_KEY"))?;
        let stripe_webhook_secret =
            get("STRIPE_WEBHOOK_SECRET").ok_or(ConfigError::Missing("STRIPE_WEBHOOK_SECRET"))?;

        let mut billing = BillingConfig::new(stripe_secret_key, stripe_webhook_secret);

        // Default URLs for checkout/portal
        let success_url = get("BILLING_SUCCESS_URL")
            .map_or_else(|| billing.default_success_url.clone(), str::to_string);
        let cancel_url = get("BILLING_CANCEL_URL")
            .map_or_else(|| billing.default_cancel_url.clone(), str::to_string);
        billing = billing.with_urls(success_url, cancel_url);
        if let Some(url) = get("BILLING_PORTAL_RETURN_URL") {
            billing = billing.with_portal_return_url(url);
        }
        for (key, price_id) in vars {
            let Some(suffix) = key.strip_prefix(PRICE_VAR_PREFIX) else {
                continue;
            };
            let tier = TierName::new(suffix.to_ascii_lowercase())
                .map_err(|_| ConfigError::InvalidPriceTier(key.clone()))?;
            billing = billing.with_price(tier, price_id.as_str());
        }

        // Request timeout
        let request_timeout_secs: u64 =
            parse_or("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), 30)?;

        // Metrics
        let metrics_enabled = get("METRICS_ENABLED").map_or(true, |v| v.parse().unwrap_or(true));

        Ok(Self {
            http_port,
            database_url,
            run_migrations,
            entitlement,
            billing,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<&str>,
    default: T,
) -> Result<T, ConfigError> {
    value.map_or(Ok(default), |v| v.parse().map_err(|_| ConfigError::Invalid(key)))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid tier in price variable: {0}")]
    InvalidPriceTier(String),
}
