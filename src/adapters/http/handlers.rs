//! HTTP handlers for the checkout and webhook endpoints.
//!
//! Handlers hold no mutable state of their own; everything they need arrives
//! through [`AppState`], which is built once at startup from the validated
//! configuration. Each request is handled independently and failures never
//! escalate past the request that triggered them.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect};
use serde::Deserialize;

use crate::adapters::stripe::{SignatureError, WebhookVerifier};
use crate::domain::payment::{CheckoutSession, PaymentIntent};
use crate::domain::webhook::{DispatchError, DispatchOutcome, EventDispatcher};
use crate::ports::{CreateCheckoutRequest, PaymentError, PaymentProvider};

use super::dto::ErrorResponse;

/// Webhook deliveries above this size fail the body read (503) before any
/// decode is attempted.
pub const MAX_WEBHOOK_BODY_BYTES: usize = 65536;

/// Metadata attached to each checkout session. Session metadata does not
/// stick through the payment lifecycle, so the same pair is also set on the
/// payment intent.
const CHECKOUT_METADATA_KEY: &str = "some_unique_id";
const CHECKOUT_METADATA_VALUE: &str = "some_unique_value";

/// Demo client reference carried through the session lifecycle.
const CLIENT_REFERENCE_ID: &str = "MY-CUSTOMER-ID";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all handler dependencies.
///
/// Cloned per request; every field is either `Arc`-wrapped or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub dispatcher: EventDispatcher,
    /// Present only when a webhook signing secret is configured.
    pub webhook_verifier: Option<Arc<WebhookVerifier>>,
    pub checkout: CheckoutOptions,
}

/// Checkout parameters fixed at startup.
#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    /// Price ID of the product being sold.
    pub price_id: String,
    /// Base URL the success/cancel redirect targets are derived from.
    pub public_base_url: String,
}

impl CheckoutOptions {
    /// Redirect target after a completed checkout. Stripe substitutes the
    /// session id into the placeholder.
    fn success_url(&self) -> String {
        format!(
            "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.public_base_url
        )
    }

    /// Redirect target after an abandoned checkout.
    fn cancel_url(&self) -> String {
        format!("{}/cancel", self.public_base_url)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// `GET|POST /checkout` - create a checkout session and redirect to it.
///
/// A provider failure short-circuits the request with 502; the redirect is
/// only issued for a session that actually exists and carries a hosted URL.
pub async fn create_checkout(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let request = CreateCheckoutRequest {
        price_id: state.checkout.price_id.clone(),
        quantity: 1,
        success_url: state.checkout.success_url(),
        cancel_url: state.checkout.cancel_url(),
        metadata: HashMap::from([(
            CHECKOUT_METADATA_KEY.to_string(),
            CHECKOUT_METADATA_VALUE.to_string(),
        )]),
        payment_intent_metadata: HashMap::from([(
            CHECKOUT_METADATA_KEY.to_string(),
            CHECKOUT_METADATA_VALUE.to_string(),
        )]),
        client_reference_id: CLIENT_REFERENCE_ID.to_string(),
    };

    let session = state
        .payment_provider
        .create_checkout_session(request)
        .await
        .map_err(ApiError::CheckoutFailed)?;

    let url = session.url.ok_or_else(|| {
        ApiError::CheckoutFailed(PaymentError::provider(
            "Checkout session is missing its hosted URL",
        ))
    })?;

    tracing::info!(session_id = %session.id, "Redirecting to hosted checkout");

    Ok(Redirect::to(&url))
}

/// Query parameters for the success endpoint.
#[derive(Debug, Deserialize)]
pub struct SuccessParams {
    pub session_id: String,
}

/// `GET /success?session_id=<id>` - read back a checkout session.
pub async fn get_success(
    State(state): State<AppState>,
    Query(params): Query<SuccessParams>,
) -> Result<Json<CheckoutSession>, ApiError> {
    let session = state
        .payment_provider
        .get_checkout_session(&params.session_id)
        .await
        .map_err(|source| ApiError::LookupFailed {
            resource: "session information",
            source,
        })?;

    Ok(Json(session))
}

/// `GET /payment_intent/:id` - fetch a payment intent by identifier.
pub async fn get_payment_intent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentIntent>, ApiError> {
    let intent = state
        .payment_provider
        .get_payment_intent(&id)
        .await
        .map_err(|source| ApiError::LookupFailed {
            resource: "payment intent",
            source,
        })?;

    Ok(Json(intent))
}

/// `POST /webhook` - receive an asynchronous provider event.
///
/// The body is read with a hard size bound before any decode; when a signing
/// secret is configured the delivery must also carry a valid
/// `Stripe-Signature` header. Unknown-but-well-formed events are
/// acknowledged.
pub async fn handle_webhook(
    State(state): State<AppState>,
    request: Request,
) -> Result<StatusCode, ApiError> {
    let (parts, body) = request.into_parts();

    let payload = axum::body::to_bytes(body, MAX_WEBHOOK_BODY_BYTES)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "error reading webhook request body");
            ApiError::BodyReadFailed
        })?;

    if let Some(verifier) = &state.webhook_verifier {
        let signature = parts
            .headers
            .get("Stripe-Signature")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::MissingSignature)?;

        verifier
            .verify(&payload, signature)
            .map_err(ApiError::InvalidSignature)?;
    }

    match state.dispatcher.dispatch(&payload).await? {
        DispatchOutcome::Handled(event_type) => {
            tracing::info!(event_type = %event_type.as_tag(), "Webhook event handled");
        }
        DispatchOutcome::Unrecognized(_) => {
            // Already logged at warning level by the dispatcher; still acked.
        }
    }

    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that maps request failures to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Checkout session creation failed; the request is short-circuited.
    CheckoutFailed(PaymentError),

    /// A session or payment-intent lookup failed.
    LookupFailed {
        resource: &'static str,
        source: PaymentError,
    },

    /// The webhook body could not be read (oversized or truncated).
    BodyReadFailed,

    /// A signing secret is configured but the delivery carried no
    /// `Stripe-Signature` header.
    MissingSignature,

    /// The delivery's signature did not verify.
    InvalidSignature(SignatureError),

    /// The delivery decoded to neither a valid envelope nor a valid payload.
    Dispatch(DispatchError),
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code, message) = match &self {
            ApiError::CheckoutFailed(err) => {
                tracing::error!(error = %err, "Checkout session creation failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "CHECKOUT_FAILED",
                    "error creating checkout session".to_string(),
                )
            }
            ApiError::LookupFailed { resource, source } => {
                tracing::error!(error = %source, "Provider lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LOOKUP_FAILED",
                    format!("error retrieving {}", resource),
                )
            }
            ApiError::BodyReadFailed => (
                StatusCode::SERVICE_UNAVAILABLE,
                "BODY_READ_FAILED",
                "error reading request body".to_string(),
            ),
            ApiError::MissingSignature => (
                StatusCode::BAD_REQUEST,
                "MISSING_SIGNATURE_HEADER",
                "Missing Stripe-Signature header".to_string(),
            ),
            ApiError::InvalidSignature(err) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_WEBHOOK_SIGNATURE",
                err.to_string(),
            ),
            ApiError::Dispatch(err @ DispatchError::MalformedEnvelope(_)) => {
                tracing::error!(error = %err, "error unmarshaling event");
                (
                    StatusCode::BAD_REQUEST,
                    "MALFORMED_ENVELOPE",
                    err.to_string(),
                )
            }
            ApiError::Dispatch(err @ DispatchError::MalformedPayload { .. }) => {
                tracing::error!(error = %err, "error unmarshaling event data");
                (
                    StatusCode::BAD_REQUEST,
                    "MALFORMED_PAYLOAD",
                    err.to_string(),
                )
            }
        };

        let body = ErrorResponse::new(error_code, message);
        (status, Json(body)).into_response()
    }
}
