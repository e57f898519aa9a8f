//! Event dispatcher.
//!
//! Decodes an inbound byte payload into a typed event and routes it to the
//! hook registered for its tag. One decode attempt per delivery; the caller
//! maps the result onto an HTTP status.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::payment::{CheckoutSession, PaymentIntent, Refund};

use super::envelope::{EventEnvelope, EventType};
use super::error::DispatchError;

/// A fully decoded webhook event.
///
/// One variant per recognized tag, each carrying the payload shape that tag
/// requires. The exhaustive match in [`EventDispatcher::dispatch`] means a
/// new variant cannot be added without wiring its decode and its hook.
#[derive(Debug, Clone)]
pub enum Event {
    PaymentIntentSucceeded(PaymentIntent),
    RefundCreated(Refund),
    CheckoutSessionCompleted(CheckoutSession),
}

impl Event {
    /// The tag this event was decoded from.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::PaymentIntentSucceeded(_) => EventType::PaymentIntentSucceeded,
            Self::RefundCreated(_) => EventType::RefundCreated,
            Self::CheckoutSessionCompleted(_) => EventType::CheckoutSessionCompleted,
        }
    }
}

/// Per-tag side effects invoked after a successful decode.
///
/// Every hook defaults to a no-op: this is the extension point for reacting
/// to provider events, not dead code. Implementations should be stateless or
/// internally synchronized; deliveries arrive concurrently and in no
/// particular order, so idempotency is the hook's concern, not the
/// dispatcher's.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called for `payment_intent.succeeded`.
    async fn on_payment_intent_succeeded(&self, _intent: PaymentIntent) {}

    /// Called for `refund.created`.
    async fn on_refund_created(&self, _refund: Refund) {}

    /// Called for `checkout.session.completed`.
    async fn on_checkout_session_completed(&self, _session: CheckoutSession) {}
}

/// Handler that acknowledges every event without side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventHandler;

#[async_trait]
impl EventHandler for NoopEventHandler {}

/// Terminal states of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was decoded and its hook ran.
    Handled(EventType),
    /// The tag is outside the recognized set; acknowledged without a hook.
    Unrecognized(String),
}

/// Routes raw webhook payloads to the registered [`EventHandler`].
#[derive(Clone)]
pub struct EventDispatcher {
    handler: Arc<dyn EventHandler>,
}

impl EventDispatcher {
    /// Create a dispatcher routing to the given handler.
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self { handler }
    }

    /// Decode a payload and invoke the hook for its tag.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::MalformedEnvelope`] when the payload is not a valid
    ///   envelope; no hook runs.
    /// - [`DispatchError::MalformedPayload`] when the envelope is valid but
    ///   the nested object does not match the tag's shape; no hook runs.
    ///
    /// An unrecognized tag is not an error: it is logged at warning level and
    /// acknowledged as [`DispatchOutcome::Unrecognized`].
    pub async fn dispatch(&self, payload: &[u8]) -> Result<DispatchOutcome, DispatchError> {
        let envelope: EventEnvelope =
            serde_json::from_slice(payload).map_err(DispatchError::MalformedEnvelope)?;

        let event = match envelope.parsed_type() {
            EventType::PaymentIntentSucceeded => {
                Event::PaymentIntentSucceeded(Self::decode(&envelope)?)
            }
            EventType::RefundCreated => Event::RefundCreated(Self::decode(&envelope)?),
            EventType::CheckoutSessionCompleted => {
                Event::CheckoutSessionCompleted(Self::decode(&envelope)?)
            }
            EventType::Unknown(tag) => {
                tracing::warn!(event_type = %tag, "Unhandled event type");
                return Ok(DispatchOutcome::Unrecognized(tag));
            }
        };

        let event_type = event.event_type();
        match event {
            Event::PaymentIntentSucceeded(intent) => {
                self.handler.on_payment_intent_succeeded(intent).await;
            }
            Event::RefundCreated(refund) => {
                self.handler.on_refund_created(refund).await;
            }
            Event::CheckoutSessionCompleted(session) => {
                self.handler.on_checkout_session_completed(session).await;
            }
        }

        Ok(DispatchOutcome::Handled(event_type))
    }

    fn decode<T: serde::de::DeserializeOwned>(
        envelope: &EventEnvelope,
    ) -> Result<T, DispatchError> {
        envelope
            .deserialize_object()
            .map_err(|source| DispatchError::MalformedPayload {
                event_type: envelope.event_type.clone(),
                source,
            })
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher").finish_non_exhaustive()
    }
}
