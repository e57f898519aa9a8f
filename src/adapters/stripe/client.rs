//! Stripe API client.
//!
//! Implements the `PaymentProvider` port over Stripe's REST API with
//! form-encoded requests, the way Stripe's own endpoints expect.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::payment::{CheckoutSession, PaymentIntent};
use crate::ports::{CreateCheckoutRequest, PaymentError, PaymentProvider};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

/// Stripe payment provider client.
#[derive(Debug)]
pub struct StripePaymentClient {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentClient {
    /// Create a new client with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
    ) -> Result<T, PaymentError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        self.parse_response(response, resource).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T, PaymentError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentError::not_found(resource));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PaymentError::authentication(
                "Stripe rejected the API key",
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(%status, error = %error_text, "Stripe API call failed");
            return Err(PaymentError::provider(format!(
                "Stripe API error: {}",
                error_text
            )));
        }

        response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentClient {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        if request.quantity < 1 {
            return Err(PaymentError::invalid_request(
                "Checkout quantity must be at least 1",
            ));
        }

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("line_items[0][price]".to_string(), request.price_id),
            (
                "line_items[0][quantity]".to_string(),
                request.quantity.to_string(),
            ),
            ("success_url".to_string(), request.success_url),
            ("cancel_url".to_string(), request.cancel_url),
            (
                "client_reference_id".to_string(),
                request.client_reference_id,
            ),
        ];

        for (key, value) in request.metadata {
            params.push((format!("metadata[{}]", key), value));
        }
        for (key, value) in request.payment_intent_metadata {
            params.push((format!("payment_intent_data[metadata][{}]", key), value));
        }

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let session: CheckoutSession = self.parse_response(response, "Checkout session").await?;

        tracing::info!(session_id = %session.id, "Checkout session created");

        Ok(session)
    }

    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        self.get_json(
            &format!("/v1/checkout/sessions/{}", session_id),
            "Checkout session",
        )
        .await
    }

    async fn get_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        self.get_json(
            &format!("/v1/payment_intents/{}", payment_intent_id),
            "Payment intent",
        )
        .await
    }
}
