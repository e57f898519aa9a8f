//! Webhook dispatch error types.

use thiserror::Error;

/// Failures produced while decoding an inbound webhook delivery.
///
/// Both variants reject the delivery; an unrecognized event type is
/// deliberately *not* an error (see
/// [`DispatchOutcome`](super::DispatchOutcome)).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The payload is not a valid event envelope. Nothing beyond the outer
    /// decode was attempted.
    #[error("malformed event envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// The envelope was valid, but the type-specific payload does not match
    /// the shape its tag requires.
    #[error("malformed payload for {event_type}: {source}")]
    MalformedPayload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("not json").unwrap_err()
    }

    #[test]
    fn malformed_envelope_displays_cause() {
        let err = DispatchError::MalformedEnvelope(json_error());
        assert!(err.to_string().starts_with("malformed event envelope"));
    }

    #[test]
    fn malformed_payload_displays_event_type() {
        let err = DispatchError::MalformedPayload {
            event_type: "payment_intent.succeeded".to_string(),
            source: json_error(),
        };
        assert!(err.to_string().contains("payment_intent.succeeded"));
    }
}
