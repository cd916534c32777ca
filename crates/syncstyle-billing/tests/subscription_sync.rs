//! Subscription sync tests
//!
//! Signed webhook events applied to the in-memory subscription store.

mod common;

use chrono::{Duration, Utc};
use serde_json::json;

use syncstyle_billing::SyncOutcome;
use syncstyle_db::{SubscriptionRepository, UpsertSubscription};
use syncstyle_types::{SubscriptionRecord, UserId};

use common::{event_payload, sign_now, test_service, tier, TestBillingService};

async fn deliver(service: &TestBillingService, event_type: &str, object: serde_json::Value) -> SyncOutcome {
    let payload = event_payload(event_type, object);
    service
        .process_webhook(&payload, &sign_now(&payload))
        .await
        .unwrap()
}

fn subscription_object(status: &str, price: &str, period_end: i64) -> serde_json::Value {
    json!({
        "id": "sub_test_123",
        "customer": "cus_test_123",
        "status": status,
        "current_period_end": period_end,
        "cancel_at_period_end": false,
        "items": { "data": [{ "price": { "id": price } }] }
    })
}

#[tokio::test]
async fn test_checkout_completed_creates_subscribed_record() {
    let (service, subscriptions, _) = test_service();
    let user = UserId::new();

    deliver(
        &service,
        "checkout.session.completed",
        json!({
            "id": "cs_test_123",
            "client_reference_id": user.to_string(),
            "customer": "cus_test_123",
            "subscription": "sub_test_123",
            "metadata": { "tier": "premium" }
        }),
    )
    .await;

    let record = subscriptions.find_by_user_id(user).await.unwrap().unwrap();
    assert!(record.subscribed);
    assert_eq!(record.tier_name, Some(tier("premium")));
    assert_eq!(record.stripe_customer_id.as_deref(), Some("cus_test_123"));
    assert_eq!(record.stripe_subscription_id.as_deref(), Some("sub_test_123"));
    assert!(record.first_subscribed_at.is_some());
}

#[tokio::test]
async fn test_checkout_without_reference_is_ignored() {
    let (service, subscriptions, _) = test_service();

    let outcome = deliver(
        &service,
        "checkout.session.completed",
        json!({ "id": "cs_test_123", "customer": "cus_test_123" }),
    )
    .await;

    assert_eq!(outcome, SyncOutcome::Ignored("missing client_reference_id"));
    assert!(subscriptions.is_empty());
}

#[tokio::test]
async fn test_subscription_update_maps_price_status_and_period() {
    let (service, subscriptions, _) = test_service();
    let user = UserId::new();
    subscriptions
        .upsert(UpsertSubscription {
            user_id: user,
            subscribed: true,
            tier_name: Some(tier("pro")),
            expires_at: None,
            stripe_customer_id: Some("cus_test_123".to_string()),
            stripe_subscription_id: None,
        })
        .await
        .unwrap();

    let period_end = (Utc::now() + Duration::days(30)).timestamp();
    deliver(
        &service,
        "customer.subscription.updated",
        subscription_object("active", "price_premium_monthly", period_end),
    )
    .await;

    let record = subscriptions.find_by_user_id(user).await.unwrap().unwrap();
    assert!(record.subscribed);
    assert_eq!(record.tier_name, Some(tier("premium")));
    assert_eq!(record.expires_at.map(|t| t.timestamp()), Some(period_end));
    assert_eq!(record.stripe_subscription_id.as_deref(), Some("sub_test_123"));
}

#[tokio::test]
async fn test_unknown_price_keeps_current_tier_and_past_due_unsubscribes() {
    let (service, subscriptions, _) = test_service();
    let user = UserId::new();
    subscriptions
        .upsert(UpsertSubscription {
            user_id: user,
            subscribed: true,
            tier_name: Some(tier("pro")),
            expires_at: None,
            stripe_customer_id: Some("cus_test_123".to_string()),
            stripe_subscription_id: None,
        })
        .await
        .unwrap();

    let period_end = (Utc::now() + Duration::days(3)).timestamp();
    deliver(
        &service,
        "customer.subscription.updated",
        subscription_object("past_due", "price_legacy", period_end),
    )
    .await;

    let record = subscriptions.find_by_user_id(user).await.unwrap().unwrap();
    assert!(!record.subscribed);
    assert_eq!(record.tier_name, Some(tier("pro")));
    assert!(record.first_subscribed_at.is_some());
}

#[tokio::test]
async fn test_subscription_created_before_checkout_uses_metadata_user() {
    let (service, subscriptions, _) = test_service();
    let user = UserId::new();

    let mut object = subscription_object(
        "trialing",
        "price_pro_monthly",
        (Utc::now() + Duration::days(14)).timestamp(),
    );
    object["metadata"] = json!({ "user_id": user.to_string(), "tier": "pro" });

    let outcome = deliver(&service, "customer.subscription.created", object).await;
    assert!(matches!(outcome, SyncOutcome::Updated(_)));

    let record = subscriptions.find_by_user_id(user).await.unwrap().unwrap();
    assert!(record.subscribed);
    assert_eq!(record.tier_name, Some(tier("pro")));
    assert_eq!(record.stripe_customer_id.as_deref(), Some("cus_test_123"));
}

#[tokio::test]
async fn test_event_for_unknown_customer_is_ignored() {
    let (service, subscriptions, _) = test_service();

    let outcome = deliver(
        &service,
        "customer.subscription.updated",
        subscription_object("active", "price_pro_monthly", Utc::now().timestamp()),
    )
    .await;

    assert_eq!(outcome, SyncOutcome::Ignored("unknown customer"));
    assert!(subscriptions.is_empty());
}

#[tokio::test]
async fn test_deleted_subscription_clears_flag_and_tier_but_keeps_trial_witness() {
    let (service, subscriptions, _) = test_service();
    let user = UserId::new();

    deliver(
        &service,
        "checkout.session.completed",
        json!({
            "id": "cs_test_123",
            "client_reference_id": user.to_string(),
            "customer": "cus_test_123",
            "subscription": "sub_test_123",
            "metadata": { "tier": "pro" }
        }),
    )
    .await;

    deliver(
        &service,
        "customer.subscription.deleted",
        subscription_object("canceled", "price_pro_monthly", Utc::now().timestamp()),
    )
    .await;

    let record = subscriptions.find_by_user_id(user).await.unwrap().unwrap();
    assert!(!record.subscribed);
    assert!(record.tier_name.is_none());
    assert!(record.first_subscribed_at.is_some());
    assert_eq!(record.stripe_customer_id.as_deref(), Some("cus_test_123"));
}

#[tokio::test]
async fn test_cancelling_subscribed_row_without_first_stamp_spends_trial() {
    let (service, subscriptions, _) = test_service();
    let user = UserId::new();
    subscriptions.insert(SubscriptionRecord {
        user_id: user,
        subscribed: true,
        tier_name: Some(tier("pro")),
        expires_at: None,
        first_subscribed_at: None,
        stripe_customer_id: Some("cus_test_123".to_string()),
        stripe_subscription_id: Some("sub_test_123".to_string()),
        updated_at: Utc::now() - Duration::days(20),
    });

    deliver(
        &service,
        "customer.subscription.deleted",
        subscription_object("canceled", "price_pro_monthly", Utc::now().timestamp()),
    )
    .await;

    let record = subscriptions.find_by_user_id(user).await.unwrap().unwrap();
    assert!(!record.subscribed);
    assert!(record.first_subscribed_at.is_some());
    assert!(record.has_ever_subscribed());
}

#[tokio::test]
async fn test_checkout_after_lapsed_period_drops_past_expiry() {
    let (service, subscriptions, _) = test_service();
    let user = UserId::new();
    subscriptions.insert(SubscriptionRecord {
        user_id: user,
        subscribed: true,
        tier_name: Some(tier("pro")),
        expires_at: Some(Utc::now() - Duration::days(30)),
        first_subscribed_at: Some(Utc::now() - Duration::days(60)),
        stripe_customer_id: Some("cus_test_123".to_string()),
        stripe_subscription_id: Some("sub_test_123".to_string()),
        updated_at: Utc::now() - Duration::days(60),
    });

    deliver(
        &service,
        "checkout.session.completed",
        json!({
            "id": "cs_test_456",
            "client_reference_id": user.to_string(),
            "customer": "cus_test_123",
            "subscription": "sub_test_456",
            "metadata": { "tier": "premium" }
        }),
    )
    .await;

    let record = subscriptions.find_by_user_id(user).await.unwrap().unwrap();
    assert_eq!(record.tier_name, Some(tier("premium")));
    assert!(record.expires_at.is_none());
    assert!(record.is_entitled_at(Utc::now()));
}

#[tokio::test]
async fn test_checkout_keeps_current_period_end() {
    let (service, subscriptions, _) = test_service();
    let user = UserId::new();
    let period_end = Utc::now() + Duration::days(12);
    subscriptions.insert(SubscriptionRecord {
        user_id: user,
        subscribed: true,
        tier_name: Some(tier("pro")),
        expires_at: Some(period_end),
        first_subscribed_at: Some(Utc::now() - Duration::days(18)),
        stripe_customer_id: Some("cus_test_123".to_string()),
        stripe_subscription_id: Some("sub_test_123".to_string()),
        updated_at: Utc::now() - Duration::days(18),
    });

    deliver(
        &service,
        "checkout.session.completed",
        json!({
            "id": "cs_test_789",
            "client_reference_id": user.to_string(),
            "customer": "cus_test_123",
            "metadata": { "tier": "pro" }
        }),
    )
    .await;

    let record = subscriptions.find_by_user_id(user).await.unwrap().unwrap();
    assert_eq!(record.expires_at, Some(period_end));
}

#[tokio::test]
async fn test_unhandled_event_is_acknowledged() {
    let (service, subscriptions, _) = test_service();

    let outcome = deliver(&service, "invoice.paid", json!({ "id": "in_test_123" })).await;

    assert_eq!(outcome, SyncOutcome::Ignored("unhandled event type"));
    assert!(subscriptions.is_empty());
}
