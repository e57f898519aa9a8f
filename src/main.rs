//! Binary entry point.
//!
//! Loads and validates configuration, wires the Stripe adapter and event
//! dispatcher into the HTTP router, and serves until interrupted.

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use checkout_relay::adapters::http::{api_router, AppState, CheckoutOptions};
use checkout_relay::adapters::stripe::{StripeConfig, StripePaymentClient, WebhookVerifier};
use checkout_relay::config::AppConfig;
use checkout_relay::domain::webhook::{EventDispatcher, NoopEventHandler};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    if config.payment.is_live_mode() {
        tracing::warn!("Stripe live mode key configured");
    }

    let stripe_config = StripeConfig::new(config.payment.stripe_api_key.clone())
        .with_base_url(config.payment.stripe_api_base_url.clone());
    let payment_provider = Arc::new(StripePaymentClient::new(stripe_config));

    let dispatcher = EventDispatcher::new(Arc::new(NoopEventHandler));

    let webhook_verifier = config
        .payment
        .stripe_webhook_secret
        .as_ref()
        .map(|secret| Arc::new(WebhookVerifier::new(secret.clone())));
    if webhook_verifier.is_none() {
        tracing::warn!("No webhook signing secret configured; deliveries are not verified");
    }

    let state = AppState {
        payment_provider,
        dispatcher,
        webhook_verifier,
        checkout: CheckoutOptions {
            price_id: config.payment.stripe_price_id.clone(),
            public_base_url: config.server.public_base_url(),
        },
    };

    let app = api_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server started");

    axum::serve(listener, app).await?;

    Ok(())
}
