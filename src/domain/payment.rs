//! Typed projections of Stripe objects.
//!
//! Only the fields this system touches are captured; Stripe's full schemas
//! carry many more. The same projections are used for API lookups and for
//! decoding webhook payloads, so a webhook delivery and a direct read of the
//! same object parse through identical code.
//!
//! All of these values are request-scoped: constructed, used once, discarded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Stripe Checkout Session object.
///
/// A provider-hosted, short-lived resource representing an in-progress
/// purchase flow. Read-only to this system.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted checkout page URL. Present on open sessions; null once the
    /// session completes or expires.
    pub url: Option<String>,

    /// Session status (open, complete, expired).
    pub status: Option<String>,

    /// Payment status (paid, unpaid, no_payment_required).
    pub payment_status: Option<String>,

    /// Total amount in the smallest currency unit.
    pub amount_total: Option<i64>,

    /// Currency (lowercase, e.g., "usd").
    pub currency: Option<String>,

    /// Payment intent created for this session.
    pub payment_intent: Option<String>,

    /// Caller-supplied reference carried through the session lifecycle.
    pub client_reference_id: Option<String>,

    /// Custom metadata attached to the session.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe Payment Intent object.
///
/// A provider-side record representing the lifecycle of a single payment
/// attempt. Read-only to this system.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentIntent {
    /// Unique payment intent identifier (pi_...).
    pub id: String,

    /// Amount in the smallest currency unit.
    pub amount: i64,

    /// Currency (lowercase).
    pub currency: String,

    /// Intent status (requires_payment_method, succeeded, canceled, ...).
    pub status: String,

    /// Customer the intent belongs to, if any.
    pub customer: Option<String>,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Unix timestamp of creation.
    #[serde(default)]
    pub created: i64,
}

/// Stripe Refund object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Refund {
    /// Unique refund identifier (re_...).
    pub id: String,

    /// Amount refunded in the smallest currency unit.
    pub amount: i64,

    /// Currency (lowercase).
    pub currency: String,

    /// Refund status (pending, succeeded, failed, canceled).
    pub status: String,

    /// Payment intent the refund applies to.
    pub payment_intent: Option<String>,

    /// Reason given for the refund, if any.
    pub reason: Option<String>,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Unix timestamp of creation.
    #[serde(default)]
    pub created: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_checkout_session_object() {
        let json = r#"{
            "id": "cs_test_abc",
            "object": "checkout.session",
            "url": "https://checkout.stripe.com/c/pay/cs_test_abc",
            "status": "open",
            "payment_status": "unpaid",
            "amount_total": 1999,
            "currency": "usd",
            "payment_intent": "pi_123",
            "client_reference_id": "MY-CUSTOMER-ID",
            "metadata": {
                "some_unique_id": "some_unique_value"
            }
        }"#;

        let session: CheckoutSession = serde_json::from_str(json).unwrap();

        assert_eq!(session.id, "cs_test_abc");
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_test_abc")
        );
        assert_eq!(session.status.as_deref(), Some("open"));
        assert_eq!(session.amount_total, Some(1999));
        assert_eq!(session.client_reference_id.as_deref(), Some("MY-CUSTOMER-ID"));
        assert_eq!(
            session.metadata.get("some_unique_id").map(String::as_str),
            Some("some_unique_value")
        );
    }

    #[test]
    fn parse_completed_session_without_url() {
        // Completed sessions come back with url: null
        let json = r#"{
            "id": "cs_done",
            "url": null,
            "status": "complete",
            "payment_status": "paid"
        }"#;

        let session: CheckoutSession = serde_json::from_str(json).unwrap();
        assert!(session.url.is_none());
        assert_eq!(session.status.as_deref(), Some("complete"));
        assert!(session.metadata.is_empty());
    }

    #[test]
    fn parse_payment_intent_object() {
        let json = r#"{
            "id": "pi_test_123",
            "object": "payment_intent",
            "amount": 1999,
            "currency": "usd",
            "status": "succeeded",
            "customer": "cus_abc",
            "created": 1704067200,
            "metadata": {"some_unique_id": "some_unique_value"}
        }"#;

        let intent: PaymentIntent = serde_json::from_str(json).unwrap();

        assert_eq!(intent.id, "pi_test_123");
        assert_eq!(intent.amount, 1999);
        assert_eq!(intent.status, "succeeded");
        assert_eq!(intent.customer.as_deref(), Some("cus_abc"));
        assert_eq!(intent.created, 1704067200);
    }

    #[test]
    fn parse_refund_object() {
        let json = r#"{
            "id": "re_test_123",
            "object": "refund",
            "amount": 500,
            "currency": "usd",
            "status": "succeeded",
            "payment_intent": "pi_test_123",
            "reason": "requested_by_customer",
            "created": 1704067200
        }"#;

        let refund: Refund = serde_json::from_str(json).unwrap();

        assert_eq!(refund.id, "re_test_123");
        assert_eq!(refund.amount, 500);
        assert_eq!(refund.payment_intent.as_deref(), Some("pi_test_123"));
        assert_eq!(refund.reason.as_deref(), Some("requested_by_customer"));
        assert!(refund.metadata.is_empty());
    }

    #[test]
    fn payment_intent_requires_amount_and_status() {
        let json = r#"{"id": "pi_incomplete"}"#;
        assert!(serde_json::from_str::<PaymentIntent>(json).is_err());
    }
}
