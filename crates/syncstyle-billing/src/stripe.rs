//! Stripe payment provider implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use syncstyle_types::{CheckoutSession, PortalSession};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::provider::{CheckoutRequest, PaymentProvider};

/// Stripe payment provider
#[derive(Clone)]
pub struct StripeProvider {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl StripeProvider {
    /// Create a new Stripe provider
    pub fn new(config: &BillingConfig) -> Self {
        Self {
            client: Client::new(),
            secret_key: config.stripe_secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Make authenticated form request to Stripe
    async fn stripe_request<T: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<T, BillingError> {
        let url = format!("{}{endpoint}", self.api_base);

        let response = self
            .client
            .request(method, &url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Stripe API request failed");
                BillingError::ProviderError(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Stripe API error");
            return Err(BillingError::ProviderError(format!(
                "Stripe API error: {status}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Stripe response");
            BillingError::Internal(e.to_string())
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    #[instrument(skip(self, request), fields(user_id = %request.user_id, tier = %request.tier))]
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        debug!(
            customer_id = ?request.customer_id,
            "Creating checkout session"
        );

        let user_id = request.user_id.to_string();
        let mut form = vec![
            ("mode", "subscription"),
            ("client_reference_id", user_id.as_str()),
            ("success_url", request.success_url.as_str()),
            ("cancel_url", request.cancel_url.as_str()),
            ("line_items[0][price]", request.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("metadata[tier]", request.tier.as_str()),
            ("metadata[user_id]", user_id.as_str()),
            ("subscription_data[metadata][tier]", request.tier.as_str()),
            ("subscription_data[metadata][user_id]", user_id.as_str()),
        ];
        if let Some(customer_id) = request.customer_id.as_deref() {
            form.push(("customer", customer_id));
        }

        let session: StripeCheckoutSession = self
            .stripe_request(reqwest::Method::POST, "/checkout/sessions", &form)
            .await?;

        let url = session.url.ok_or_else(|| {
            BillingError::ProviderError("checkout session has no URL".to_string())
        })?;

        Ok(CheckoutSession {
            session_id: session.id,
            url,
        })
    }

    #[instrument(skip(self))]
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        debug!(customer_id = %customer_id, "Creating portal session");

        let form = [("customer", customer_id), ("return_url", return_url)];

        let session: StripeBillingPortalSession = self
            .stripe_request(reqwest::Method::POST, "/billing_portal/sessions", &form)
            .await?;

        Ok(PortalSession { url: session.url })
    }
}

impl std::fmt::Debug for StripeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeProvider")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

// Stripe API response types

/// Stripe checkout session
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    /// Session ID
    pub id: String,
    /// Checkout URL
    pub url: Option<String>,
}

/// Stripe billing portal session
#[derive(Debug, Clone, Deserialize)]
pub struct StripeBillingPortalSession {
    /// Portal URL
    pub url: String,
}
