//! SyncStyle Billing - Stripe integration
//!
//! Checkout and customer portal sessions, webhook signature verification,
//! and synchronisation of subscription records from webhook events. The
//! entitlement engine reads what this crate writes.
//!
//! # Example
//!
//! ```rust,ignore
//! use syncstyle_billing::{BillingConfig, BillingService, StripeProvider};
//!
//! let config = BillingConfig::new("sk_test_...", "whsec_...")
//!     .with_price(TierName::new("pro")?, "price_...");
//!
//! let billing = BillingService::new(
//!     Arc::new(repos.subscriptions),
//!     Arc::new(StripeProvider::new(&config)),
//!     config,
//! );
//!
//! let session = billing.create_checkout(user_id, &tier, None, None).await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod service;
pub mod stripe;
pub mod sync;
pub mod webhook;

pub use config::BillingConfig;
pub use error::BillingError;
pub use provider::{CheckoutRequest, PaymentProvider};
pub use service::{BillingService, StripeBillingService};
pub use stripe::StripeProvider;
pub use sync::{SubscriptionSync, SyncOutcome};
pub use webhook::{WebhookEvent, WebhookEventData, WebhookEventType, WebhookHandler};

pub use syncstyle_types::{CheckoutSession, PortalSession};
