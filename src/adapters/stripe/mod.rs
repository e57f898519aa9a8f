//! Stripe adapter.
//!
//! Implements the `PaymentProvider` port against the Stripe REST API and
//! provides webhook signature verification for inbound deliveries.

mod client;
mod signature;

pub use client::{StripeConfig, StripePaymentClient};
pub use signature::{
    hex_encode, sign_payload, SignatureError, SignatureHeader, SignatureParseError,
    WebhookVerifier,
};
