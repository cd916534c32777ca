//! Application state for the Entitlement API service.

use std::sync::Arc;

use syncstyle_billing::{BillingService, PaymentProvider, StripeProvider};
use syncstyle_db::pg::{PgSubscriptionRepository, PgTierRepository, PgUsageRepository};
use syncstyle_db::{DbPool, SubscriptionRepository, TierRepository, UsageRepository};
use syncstyle_entitlement::{EntitlementEngine, UsageRecorder};

use crate::config::Config;

/// Store and payment provider implementations the service runs on
pub trait Backend: Send + Sync + 'static {
    type Subscriptions: SubscriptionRepository + 'static;
    type Tiers: TierRepository + 'static;
    type Usage: UsageRepository + 'static;
    type Payments: PaymentProvider + 'static;
}

/// PostgreSQL stores with Stripe
#[derive(Debug)]
pub struct PgBackend;

impl Backend for PgBackend {
    type Subscriptions = PgSubscriptionRepository;
    type Tiers = PgTierRepository;
    type Usage = PgUsageRepository;
    type Payments = StripeProvider;
}

/// Engine over a backend's stores
pub type Engine<B> = EntitlementEngine<
    <B as Backend>::Subscriptions,
    <B as Backend>::Tiers,
    <B as Backend>::Usage,
>;

/// Billing over a backend's subscription store and provider
pub type Billing<B> = BillingService<<B as Backend>::Subscriptions, <B as Backend>::Payments>;

/// Application state shared across all handlers
pub struct AppState<B: Backend> {
    /// Feature and usage checks, upgrade prompts
    pub engine: Engine<B>,
    /// Usage ledger writes
    pub recorder: UsageRecorder<B::Usage>,
    /// Checkout, portal and webhooks
    pub billing: Arc<Billing<B>>,
    /// Database pool for readiness checks, absent for in-memory stores
    pub pool: Option<DbPool>,
    /// Configuration
    pub config: Arc<Config>,
}

impl<B: Backend> AppState<B> {
    /// Create new application state
    pub fn new(
        engine: Engine<B>,
        recorder: UsageRecorder<B::Usage>,
        billing: Billing<B>,
        pool: Option<DbPool>,
        config: Config,
    ) -> Self {
        Self {
            engine,
            recorder,
            billing: Arc::new(billing),
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            recorder: self.recorder.clone(),
            billing: Arc::clone(&self.billing),
            pool: self.pool.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<B: Backend> std::fmt::Debug for AppState<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
