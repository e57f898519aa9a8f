//! Checkout Relay - Stripe checkout and webhook relay demonstration server.
//!
//! Exposes a minimal HTTP surface that creates Stripe checkout sessions,
//! reads back sessions and payment intents, and dispatches inbound webhook
//! events to typed per-event handlers.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
