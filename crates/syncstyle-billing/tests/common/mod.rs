//! Common test utilities for syncstyle-billing integration tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use syncstyle_billing::{BillingConfig, BillingError, BillingService, CheckoutRequest, PaymentProvider};
use syncstyle_db::memory::MemorySubscriptionRepository;
use syncstyle_types::{CheckoutSession, PortalSession, TierName};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret_key";

/// Generate a valid Stripe webhook signature
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let signed_payload = format!("{}.{}", timestamp, std::str::from_utf8(payload).unwrap());

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(signed_payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    format!("t={},v1={}", timestamp, signature)
}

/// Sign with the test secret at the current time
#[allow(dead_code)]
pub fn sign_now(payload: &[u8]) -> String {
    sign(payload, WEBHOOK_SECRET, Utc::now().timestamp())
}

/// Wrap an object into a Stripe event payload
#[allow(dead_code)]
pub fn event_payload(event_type: &str, object: serde_json::Value) -> Vec<u8> {
    let payload = serde_json::json!({
        "id": "evt_test_123",
        "type": event_type,
        "created": Utc::now().timestamp(),
        "data": { "object": object }
    });
    serde_json::to_vec(&payload).unwrap()
}

#[allow(dead_code)]
pub fn tier(name: &str) -> TierName {
    TierName::new(name).unwrap()
}

/// Billing config with pro and premium prices
pub fn test_config() -> BillingConfig {
    BillingConfig::new("sk_test_123", WEBHOOK_SECRET)
        .with_price(TierName::new("pro").unwrap(), "price_pro_monthly")
        .with_price(TierName::new("premium").unwrap(), "price_premium_monthly")
        .with_urls("https://app.test/success", "https://app.test/cancel")
        .with_portal_return_url("https://app.test/billing")
}

/// Provider that records requests instead of calling Stripe
#[derive(Default)]
pub struct RecordingProvider {
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    pub portals: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl PaymentProvider for RecordingProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        self.checkouts.lock().unwrap().push(request);
        Ok(CheckoutSession {
            session_id: "cs_test_1".to_string(),
            url: "https://checkout.stripe.test/cs_test_1".to_string(),
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        self.portals
            .lock()
            .unwrap()
            .push((customer_id.to_string(), return_url.to_string()));
        Ok(PortalSession {
            url: "https://billing.stripe.test/session".to_string(),
        })
    }
}

pub type TestBillingService = BillingService<MemorySubscriptionRepository, RecordingProvider>;

/// Billing service over an in-memory store and a recording provider
pub fn test_service() -> (
    TestBillingService,
    MemorySubscriptionRepository,
    Arc<RecordingProvider>,
) {
    let subscriptions = MemorySubscriptionRepository::new();
    let provider = Arc::new(RecordingProvider::default());
    let service = BillingService::new(
        Arc::new(subscriptions.clone()),
        Arc::clone(&provider),
        test_config(),
    );
    (service, subscriptions, provider)
}
