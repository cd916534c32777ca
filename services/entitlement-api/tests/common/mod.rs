//! Common test utilities for entitlement-api integration tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower::ServiceExt;

use entitlement_api::{build_router, AppState, Backend, Config};
use syncstyle_billing::{BillingConfig, BillingError, BillingService, CheckoutRequest, PaymentProvider};
use syncstyle_db::memory::{MemorySubscriptionRepository, MemoryTierRepository, MemoryUsageRepository};
use syncstyle_db::MemoryRepositories;
use syncstyle_entitlement::{EntitlementConfig, EntitlementEngine, UsageRecorder};
use syncstyle_types::{
    CheckoutSession, Feature, PortalSession, Tier, TierLimits, TierName, UsageLimit, UsageType,
};

#[allow(dead_code)]
pub const WEBHOOK_SECRET: &str = "whsec_test_secret_key";

/// Provider that answers without calling Stripe
pub struct FakeProvider;

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        Ok(CheckoutSession {
            session_id: format!("cs_test_{}", request.tier),
            url: "https://checkout.stripe.test/session".to_string(),
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        _return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        Ok(PortalSession {
            url: format!("https://billing.stripe.test/{customer_id}"),
        })
    }
}

/// In-memory stores with the fake provider
pub struct TestBackend;

impl Backend for TestBackend {
    type Subscriptions = MemorySubscriptionRepository;
    type Tiers = MemoryTierRepository;
    type Usage = MemoryUsageRepository;
    type Payments = FakeProvider;
}

fn tier(name: &str, price: i64, features: &[Feature], limits: &[(UsageType, i64)]) -> Tier {
    Tier {
        name: TierName::new(name).unwrap(),
        price_monthly_cents: price,
        price_yearly_cents: price * 10,
        features: features.iter().copied().collect(),
        limits: limits.iter().fold(TierLimits::new(), |acc, (usage_type, raw)| {
            acc.with(*usage_type, UsageLimit::from_raw(*raw).unwrap())
        }),
        is_active: true,
    }
}

fn test_config() -> Config {
    Config {
        http_port: 0,
        database_url: "postgres://unused".to_string(),
        run_migrations: false,
        entitlement: EntitlementConfig::default(),
        billing: BillingConfig::new("sk_test_123", WEBHOOK_SECRET)
            .with_price(TierName::new("pro").unwrap(), "price_pro_monthly")
            .with_price(TierName::new("premium").unwrap(), "price_premium_monthly"),
        request_timeout: Duration::from_secs(5),
        metrics_enabled: false,
    }
}

/// Router over seeded in-memory stores, plus the stores themselves
pub fn test_app() -> (Router, MemoryRepositories) {
    use Feature::*;
    use UsageType::*;

    let repos = MemoryRepositories::new();
    repos.tiers.insert(tier(
        "pro",
        499,
        &[AiOutfitSuggestions, WeatherIntegration, UnlimitedWardrobe],
        &[(AiRecommendations, 50), (PhotoUploads, 100), (OutfitGenerations, 50)],
    ));
    repos.tiers.insert(tier(
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
    ));

    let config = test_config();
    let subscriptions = Arc::new(repos.subscriptions.clone());
    let usage = Arc::new(repos.usage.clone());

    let engine = EntitlementEngine::new(
        Arc::clone(&subscriptions),
        Arc::new(repos.tiers.clone()),
        Arc::clone(&usage),
        config.entitlement.clone(),
    );
    let recorder = UsageRecorder::new(usage, config.entitlement.clone());
    let billing = BillingService::new(subscriptions, Arc::new(FakeProvider), config.billing.clone());

    let state = AppState::<TestBackend>::new(engine, recorder, billing, None, config);
    (build_router(state, None), repos)
}

/// Send a request and return status plus parsed JSON body (null when empty)
pub async fn send(app: &Router, request: Request<Body>) -> (Response<()>, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (Response::from_parts(parts, ()), json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Generate a valid Stripe webhook signature
#[allow(dead_code)]
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let signed_payload = format!("{}.{}", timestamp, std::str::from_utf8(payload).unwrap());

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(signed_payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    format!("t={},v1={}", timestamp, signature)
}

/// Signed webhook request
#[allow(dead_code)]
pub fn webhook(event_type: &str, object: serde_json::Value, secret: &str) -> Request<Body> {
    let payload = serde_json::to_vec(&serde_json::json!({
        "id": "evt_test_123",
        "type": event_type,
        "created": Utc::now().timestamp(),
        "data": { "object": object }
    }))
    .unwrap();

    Request::post("/webhooks/stripe")
        .header("stripe-signature", sign(&payload, secret, Utc::now().timestamp()))
        .body(Body::from(payload))
        .unwrap()
}
