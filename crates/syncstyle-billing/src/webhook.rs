//! Stripe webhook handling

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, error, info, instrument, warn};

use crate::config::DEFAULT_WEBHOOK_TOLERANCE;
use crate::error::BillingError;

/// Webhook event types we handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    /// Checkout session completed
    CheckoutSessionCompleted,
    /// Customer subscription created
    CustomerSubscriptionCreated,
    /// Customer subscription updated
    CustomerSubscriptionUpdated,
    /// Customer subscription deleted
    CustomerSubscriptionDeleted,
    /// Any other event type
    Unknown(String),
}

impl From<&str> for WebhookEventType {
    fn from(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "customer.subscription.created" => Self::CustomerSubscriptionCreated,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl WebhookEventType {
    /// Stripe event name
    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CustomerSubscriptionCreated => "customer.subscription.created",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::Unknown(name) => name,
        }
    }
}

/// Parsed webhook event
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    /// Event ID
    pub id: String,
    /// Event type
    pub event_type: WebhookEventType,
    /// Event data
    pub data: WebhookEventData,
    /// When the event was created (Unix timestamp)
    pub created: i64,
}

/// Webhook event data
#[derive(Debug, Clone)]
pub enum WebhookEventData {
    /// Checkout session data
    CheckoutSession(CheckoutSessionData),
    /// Subscription data
    Subscription(SubscriptionData),
    /// Raw JSON for events we do not act on
    Raw(serde_json::Value),
}

/// Checkout session completed data
#[derive(Debug, Clone)]
pub struct CheckoutSessionData {
    /// Session ID
    pub session_id: String,
    /// Our user ID, as passed at checkout
    pub client_reference_id: Option<String>,
    /// Customer ID
    pub customer_id: Option<String>,
    /// Subscription ID
    pub subscription_id: Option<String>,
    /// Session metadata
    pub metadata: HashMap<String, String>,
}

/// Subscription event data
#[derive(Debug, Clone)]
pub struct SubscriptionData {
    /// Subscription ID
    pub subscription_id: String,
    /// Customer ID
    pub customer_id: String,
    /// Status
    pub status: String,
    /// Price of the first subscription item
    pub price_id: Option<String>,
    /// Current period end
    pub period_end: Option<DateTime<Utc>>,
    /// Whether it cancels at period end
    pub cancel_at_period_end: bool,
    /// Subscription metadata
    pub metadata: HashMap<String, String>,
}

impl SubscriptionData {
    /// Whether the status grants access
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_str(), "active" | "trialing")
    }
}

/// Webhook handler for processing Stripe events
#[derive(Clone)]
pub struct WebhookHandler {
    webhook_secret: String,
    tolerance: Duration,
}

impl WebhookHandler {
    /// Create a new webhook handler
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            tolerance: DEFAULT_WEBHOOK_TOLERANCE,
        }
    }

    /// Set the timestamp tolerance
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Verify and parse a webhook payload
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, BillingError> {
        self.verify_and_parse_at(payload, signature, Utc::now())
    }

    /// Verify and parse a webhook payload against a given clock
    #[instrument(skip_all)]
    pub fn verify_and_parse_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<WebhookEvent, BillingError> {
        self.verify_signature(payload, signature, now)?;

        let raw_event: RawStripeEvent = serde_json::from_slice(payload)
            .map_err(|e| BillingError::WebhookError(e.to_string()))?;

        debug!(event_id = %raw_event.id, event_type = %raw_event.event_type, "Parsed webhook event");

        let event_type = WebhookEventType::from(raw_event.event_type.as_str());
        let data = parse_event_data(&event_type, raw_event.data.object)?;

        Ok(WebhookEvent {
            id: raw_event.id,
            event_type,
            data,
            created: raw_event.created,
        })
    }

    /// Verify a `t=<timestamp>,v1=<hex hmac>` signature header
    fn verify_signature(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), BillingError> {
        let mut timestamp: Option<&str> = None;
        let mut candidates: Vec<&str> = Vec::new();

        for part in signature.split(',') {
            if let Some((key, value)) = part.trim().split_once('=') {
                match key {
                    "t" => timestamp = Some(value),
                    "v1" => candidates.push(value),
                    _ => {}
                }
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            warn!("Missing timestamp in webhook signature");
            BillingError::WebhookError("Missing timestamp".to_string())
        })?;

        if candidates.is_empty() {
            warn!("Missing v1 signature in webhook signature");
            return Err(BillingError::WebhookError("Missing signature".to_string()));
        }

        let mut mac = Hmac::<Sha256>::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| BillingError::Internal("HMAC error".to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        // Stripe sends one v1 entry per active secret during rotation
        let matched = candidates
            .iter()
            .any(|candidate| constant_time_eq(candidate.as_bytes(), expected.as_bytes()));
        if !matched {
            error!("Webhook signature verification failed");
            return Err(BillingError::WebhookError(
                "Signature verification failed".to_string(),
            ));
        }

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| BillingError::WebhookError("Invalid timestamp format".to_string()))?;
        let age = now.timestamp().saturating_sub(ts).unsigned_abs();
        if age > self.tolerance.as_secs() {
            warn!(timestamp = ts, now = now.timestamp(), "Webhook timestamp outside tolerance");
            return Err(BillingError::WebhookError("Timestamp too old".to_string()));
        }

        Ok(())
    }
}

impl std::fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

/// Parse event data based on type
fn parse_event_data(
    event_type: &WebhookEventType,
    object: serde_json::Value,
) -> Result<WebhookEventData, BillingError> {
    match event_type {
        WebhookEventType::CheckoutSessionCompleted => {
            let session: RawCheckoutSession = serde_json::from_value(object)
                .map_err(|e| BillingError::WebhookError(e.to_string()))?;
            Ok(WebhookEventData::CheckoutSession(CheckoutSessionData {
                session_id: session.id,
                client_reference_id: session.client_reference_id,
                customer_id: session.customer,
                subscription_id: session.subscription,
                metadata: session.metadata,
            }))
        }
        WebhookEventType::CustomerSubscriptionCreated
        | WebhookEventType::CustomerSubscriptionUpdated
        | WebhookEventType::CustomerSubscriptionDeleted => {
            let sub: RawSubscription = serde_json::from_value(object)
                .map_err(|e| BillingError::WebhookError(e.to_string()))?;

            let first_item = sub.items.data.into_iter().next();
            // Newer API versions carry the period on the item
            let period_end = sub
                .current_period_end
                .or_else(|| first_item.as_ref().and_then(|item| item.current_period_end))
                .map(timestamp_to_datetime)
                .transpose()?;

            Ok(WebhookEventData::Subscription(SubscriptionData {
                subscription_id: sub.id,
                customer_id: sub.customer,
                status: sub.status,
                price_id: first_item.and_then(|item| item.price).map(|price| price.id),
                period_end,
                cancel_at_period_end: sub.cancel_at_period_end,
                metadata: sub.metadata,
            }))
        }
        WebhookEventType::Unknown(name) => {
            info!(event_type = %name, "Received unhandled webhook event type");
            Ok(WebhookEventData::Raw(object))
        }
    }
}

fn timestamp_to_datetime(ts: i64) -> Result<DateTime<Utc>, BillingError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| BillingError::WebhookError(format!("Invalid timestamp {ts}")))
}

/// Constant-time comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}

// Raw Stripe payloads

#[derive(Debug, Deserialize)]
struct RawStripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
    created: i64,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawCheckoutSession {
    id: String,
    client_reference_id: Option<String>,
    customer: Option<String>,
    subscription: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawSubscription {
    id: String,
    customer: String,
    status: String,
    current_period_end: Option<i64>,
    #[serde(default)]
    cancel_at_period_end: bool,
    #[serde(default)]
    items: RawList<RawSubscriptionItem>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawList<T> {
    data: Vec<T>,
}

impl<T> Default for RawList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
struct RawSubscriptionItem {
    price: Option<RawPrice>,
    current_period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    id: String,
}
