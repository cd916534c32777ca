//! Billing service

use std::sync::Arc;

use metrics::counter;
use tracing::{info, instrument, warn};

use syncstyle_db::SubscriptionRepository;
use syncstyle_types::{CheckoutSession, PortalSession, TierName, UserId};

use crate::provider::{CheckoutRequest, PaymentProvider};
use crate::stripe::StripeProvider;
use crate::sync::{SubscriptionSync, SyncOutcome};
use crate::webhook::WebhookHandler;
use crate::{BillingConfig, BillingError};

/// Billing service over Stripe
pub type StripeBillingService<S> = BillingService<S, StripeProvider>;

/// Checkout, portal and webhook entry points
pub struct BillingService<S, P> {
    subscriptions: Arc<S>,
    provider: Arc<P>,
    webhooks: WebhookHandler,
    sync: SubscriptionSync<S>,
    config: BillingConfig,
}

impl<S, P> BillingService<S, P>
where
    S: SubscriptionRepository,
    P: PaymentProvider,
{
    /// Create a new billing service
    pub fn new(subscriptions: Arc<S>, provider: Arc<P>, config: BillingConfig) -> Self {
        let webhooks = WebhookHandler::new(config.stripe_webhook_secret.clone())
            .with_tolerance(config.webhook_tolerance);
        let sync = SubscriptionSync::new(Arc::clone(&subscriptions), &config);

        Self {
            subscriptions,
            provider,
            webhooks,
            sync,
            config,
        }
    }

    /// Billing configuration
    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// Start a subscription checkout for a tier
    ///
    /// Reuses the user's Stripe customer when one is on record.
    #[instrument(skip(self))]
    pub async fn create_checkout(
        &self,
        user_id: UserId,
        tier: &TierName,
        success_url: Option<&str>,
        cancel_url: Option<&str>,
    ) -> Result<CheckoutSession, BillingError> {
        let price_id = self
            .config
            .price_for(tier)
            .ok_or_else(|| BillingError::UnknownTier(tier.to_string()))?;

        let customer_id = self
            .subscriptions
            .find_by_user_id(user_id)
            .await?
            .and_then(|record| record.stripe_customer_id);

        let session = self
            .provider
            .create_checkout_session(CheckoutRequest {
                user_id,
                tier: tier.clone(),
                price_id: price_id.to_string(),
                customer_id,
                success_url: success_url
                    .unwrap_or(&self.config.default_success_url)
                    .to_string(),
                cancel_url: cancel_url
                    .unwrap_or(&self.config.default_cancel_url)
                    .to_string(),
            })
            .await?;

        info!(user_id = %user_id, tier = %tier, session_id = %session.session_id, "Checkout session created");
        Ok(session)
    }

    /// Open the customer portal for a user with a Stripe customer
    #[instrument(skip(self))]
    pub async fn create_portal_session(
        &self,
        user_id: UserId,
        return_url: Option<&str>,
    ) -> Result<PortalSession, BillingError> {
        let customer_id = self
            .subscriptions
            .find_by_user_id(user_id)
            .await?
            .and_then(|record| record.stripe_customer_id)
            .ok_or(BillingError::CustomerNotFound)?;

        self.provider
            .create_portal_session(
                &customer_id,
                return_url.unwrap_or(&self.config.default_portal_return_url),
            )
            .await
    }

    /// Verify, parse and apply a Stripe webhook
    #[instrument(skip_all)]
    pub async fn process_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<SyncOutcome, BillingError> {
        let event = match self.webhooks.verify_and_parse(payload, signature) {
            Ok(event) => event,
            Err(e) => {
                counter!("billing_webhooks_processed_total", "status" => "rejected").increment(1);
                return Err(e);
            }
        };

        let outcome = self.sync.apply(&event).await;
        let status = match &outcome {
            Ok(outcome) => outcome.label(),
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Webhook event could not be applied");
                "failed"
            }
        };
        counter!("billing_webhooks_processed_total", "status" => status).increment(1);

        outcome
    }
}

impl<S, P> std::fmt::Debug for BillingService<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
