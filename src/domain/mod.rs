//! Domain types and the webhook event dispatch core.

pub mod payment;
pub mod webhook;
