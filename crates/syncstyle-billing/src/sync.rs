//! Subscription record synchronisation from webhook events
//!
//! Each handled event reads the current record and writes its full new
//! state. Records are never deleted; cancellation clears the flag and tier.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use syncstyle_db::{SubscriptionRepository, UpsertSubscription};
use syncstyle_types::{SubscriptionRecord, TierName, UserId};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::webhook::{
    CheckoutSessionData, SubscriptionData, WebhookEvent, WebhookEventData, WebhookEventType,
};

/// What a webhook event did to the subscription store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Record written
    Updated(SubscriptionRecord),
    /// Event acknowledged without a write
    Ignored(&'static str),
}

impl SyncOutcome {
    /// Metrics label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Updated(_) => "updated",
            Self::Ignored(_) => "ignored",
        }
    }
}

/// Applies webhook events to the subscription store
pub struct SubscriptionSync<S> {
    subscriptions: Arc<S>,
    config: BillingConfig,
}

impl<S: SubscriptionRepository> SubscriptionSync<S> {
    /// Create a new sync
    pub fn new(subscriptions: Arc<S>, config: &BillingConfig) -> Self {
        Self {
            subscriptions,
            config: config.clone(),
        }
    }

    /// Apply one verified event
    #[instrument(skip_all, fields(event_id = %event.id, event_type = %event.event_type.as_str()))]
    pub async fn apply(&self, event: &WebhookEvent) -> Result<SyncOutcome, BillingError> {
        match (&event.event_type, &event.data) {
            (WebhookEventType::CheckoutSessionCompleted, WebhookEventData::CheckoutSession(data)) => {
                self.checkout_completed(data).await
            }
            (
                WebhookEventType::CustomerSubscriptionCreated
                | WebhookEventType::CustomerSubscriptionUpdated,
                WebhookEventData::Subscription(data),
            ) => self.subscription_changed(data).await,
            (WebhookEventType::CustomerSubscriptionDeleted, WebhookEventData::Subscription(data)) => {
                self.subscription_deleted(data).await
            }
            _ => Ok(SyncOutcome::Ignored("unhandled event type")),
        }
    }

    async fn checkout_completed(
        &self,
        data: &CheckoutSessionData,
    ) -> Result<SyncOutcome, BillingError> {
        let Some(user_id) = data
            .client_reference_id
            .as_deref()
            .and_then(|id| UserId::parse(id).ok())
        else {
            warn!(session_id = %data.session_id, "Checkout session without a valid client_reference_id");
            return Ok(SyncOutcome::Ignored("missing client_reference_id"));
        };

        let existing = self.subscriptions.find_by_user_id(user_id).await?;
        let tier_name = data
            .metadata
            .get("tier")
            .and_then(|tier| TierName::new(tier.as_str()).ok())
            .or_else(|| existing.as_ref().and_then(|r| r.tier_name.clone()));

        if tier_name.is_none() {
            warn!(user_id = %user_id, session_id = %data.session_id, "Checkout completed without a tier");
        }

        let record = self
            .subscriptions
            .upsert(UpsertSubscription {
                user_id,
                subscribed: true,
                tier_name,
                // Period end arrives with the subscription events; keep one
                // already written only while it still grants access
                expires_at: existing
                    .as_ref()
                    .filter(|r| r.is_entitled_at(Utc::now()))
                    .and_then(|r| r.expires_at),
                stripe_customer_id: data.customer_id.clone(),
                stripe_subscription_id: data.subscription_id.clone(),
            })
            .await?;

        info!(user_id = %user_id, tier = ?record.tier_name, "Subscription started from checkout");
        Ok(SyncOutcome::Updated(record))
    }

    async fn subscription_changed(
        &self,
        data: &SubscriptionData,
    ) -> Result<SyncOutcome, BillingError> {
        let Some((user_id, existing)) = self.resolve_user(data).await? else {
            return Ok(SyncOutcome::Ignored("unknown customer"));
        };

        let tier_name = data
            .price_id
            .as_deref()
            .and_then(|price| self.config.tier_for_price(price).cloned())
            .or_else(|| existing.as_ref().and_then(|r| r.tier_name.clone()))
            .or_else(|| {
                data.metadata
                    .get("tier")
                    .and_then(|tier| TierName::new(tier.as_str()).ok())
            });

        let record = self
            .subscriptions
            .upsert(UpsertSubscription {
                user_id,
                subscribed: data.is_active(),
                tier_name,
                expires_at: data.period_end,
                stripe_customer_id: Some(data.customer_id.clone()),
                stripe_subscription_id: Some(data.subscription_id.clone()),
            })
            .await?;

        info!(
            user_id = %record.user_id,
            status = %data.status,
            tier = ?record.tier_name,
            cancel_at_period_end = data.cancel_at_period_end,
            "Subscription updated"
        );
        Ok(SyncOutcome::Updated(record))
    }

    async fn subscription_deleted(
        &self,
        data: &SubscriptionData,
    ) -> Result<SyncOutcome, BillingError> {
        let Some((_, Some(existing))) = self.resolve_user(data).await? else {
            return Ok(SyncOutcome::Ignored("unknown customer"));
        };

        let mut update = UpsertSubscription::from_record(&existing);
        update.subscribed = false;
        update.tier_name = None;

        let record = self.subscriptions.upsert(update).await?;

        info!(user_id = %record.user_id, "Subscription cancelled");
        Ok(SyncOutcome::Updated(record))
    }

    /// User behind a subscription event and their current record
    ///
    /// Looks the customer up first, then falls back to the user ID stamped
    /// into the subscription metadata at checkout, which also covers events
    /// that arrive before `checkout.session.completed`.
    async fn resolve_user(
        &self,
        data: &SubscriptionData,
    ) -> Result<Option<(UserId, Option<SubscriptionRecord>)>, BillingError> {
        if let Some(record) = self
            .subscriptions
            .find_by_stripe_customer_id(&data.customer_id)
            .await?
        {
            return Ok(Some((record.user_id, Some(record))));
        }

        let Some(user_id) = data
            .metadata
            .get("user_id")
            .and_then(|id| UserId::parse(id).ok())
        else {
            warn!(
                customer_id = %data.customer_id,
                subscription_id = %data.subscription_id,
                "Subscription event for unknown customer"
            );
            return Ok(None);
        };

        let record = self.subscriptions.find_by_user_id(user_id).await?;
        Ok(Some((user_id, record)))
    }
}

impl<S> std::fmt::Debug for SubscriptionSync<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionSync")
            .field("price_ids", &self.config.price_ids)
            .finish_non_exhaustive()
    }
}
