//! Webhook event envelope.
//!
//! The outer wrapper around every Stripe webhook delivery: a type tag plus an
//! opaque nested object. The tag alone determines how the nested object must
//! be decoded.

use serde::{Deserialize, Serialize};

/// Raw webhook event envelope as received on the wire.
///
/// Only the fields dispatch needs are captured; Stripe's full event schema
/// carries more (api version, request context, livemode) that this system
/// ignores.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (evt_...).
    #[serde(default)]
    pub id: Option<String>,

    /// Event type tag (e.g., "payment_intent.succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Container for the event-specific payload. Tolerated when absent so a
    /// dataless delivery with an unrecognized tag is still acknowledged; a
    /// recognized tag then fails its payload decode instead.
    #[serde(default)]
    pub data: EventEnvelopeData,
}

/// Container for the type-specific payload.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventEnvelopeData {
    /// The object that triggered the event; its shape depends on the
    /// envelope's type tag. `null` when the delivery carried no data.
    pub object: serde_json::Value,
}

impl EventEnvelope {
    /// Classify the envelope's tag against the recognized set.
    pub fn parsed_type(&self) -> EventType {
        EventType::from_tag(&self.event_type)
    }

    /// Decode the nested object as the given type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Recognized webhook event tags.
///
/// A closed set, extensible by adding a case: new recognized tags get a
/// variant here, an arm in the dispatcher, and a hook on
/// [`EventHandler`](super::EventHandler). Anything else falls through to
/// [`EventType::Unknown`], which is acknowledged rather than rejected so that
/// new provider event types never break the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    /// A payment intent completed successfully.
    PaymentIntentSucceeded,
    /// A refund was created.
    RefundCreated,
    /// A checkout session completed.
    CheckoutSessionCompleted,
    /// Any tag outside the recognized set.
    Unknown(String),
}

impl EventType {
    /// Map a wire tag to its variant.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "refund.created" => Self::RefundCreated,
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The wire tag for this variant.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::RefundCreated => "refund.created",
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::Unknown(tag) => tag,
        }
    }

    /// True when the tag is in the recognized set.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_envelope_with_recognized_tag() {
        let json = r#"{
            "id": "evt_123",
            "type": "payment_intent.succeeded",
            "data": {
                "object": {"id": "pi_123"}
            }
        }"#;

        let envelope: EventEnvelope = serde_json::from_str(json).unwrap();

        assert_eq!(envelope.id.as_deref(), Some("evt_123"));
        assert_eq!(envelope.parsed_type(), EventType::PaymentIntentSucceeded);
        assert_eq!(envelope.data.object["id"], "pi_123");
    }

    #[test]
    fn parse_envelope_without_id() {
        let json = r#"{"type": "refund.created", "data": {"object": {}}}"#;
        let envelope: EventEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.id.is_none());
        assert_eq!(envelope.parsed_type(), EventType::RefundCreated);
    }

    #[test]
    fn envelope_without_data_defaults_to_null_object() {
        let json = r#"{"type": "refund.created"}"#;
        let envelope: EventEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.data.object.is_null());
    }

    #[test]
    fn unknown_tag_round_trips() {
        let tag = EventType::from_tag("some.future.event");
        assert_eq!(tag, EventType::Unknown("some.future.event".to_string()));
        assert_eq!(tag.as_tag(), "some.future.event");
        assert!(!tag.is_recognized());
    }

    #[test]
    fn recognized_tags_round_trip() {
        for tag in [
            "payment_intent.succeeded",
            "refund.created",
            "checkout.session.completed",
        ] {
            let parsed = EventType::from_tag(tag);
            assert!(parsed.is_recognized(), "{tag} should be recognized");
            assert_eq!(parsed.as_tag(), tag);
        }
    }
}
