//! Payment provider abstraction

use async_trait::async_trait;

use syncstyle_types::{CheckoutSession, PortalSession, TierName, UserId};

use crate::BillingError;

/// Subscription checkout for one user and tier
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// User the subscription is for, echoed back as `client_reference_id`
    pub user_id: UserId,
    /// Tier being purchased
    pub tier: TierName,
    /// Provider price for the tier
    pub price_id: String,
    /// Existing provider customer to reuse
    pub customer_id: Option<String>,
    /// Redirect after payment
    pub success_url: String,
    /// Redirect on abandon
    pub cancel_url: String,
}

/// Payment provider trait
///
/// Abstracts payment processing to allow different providers (Stripe, etc.)
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a subscription checkout session
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError>;

    /// Create a customer portal session
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError>;
}
