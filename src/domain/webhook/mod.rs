//! Webhook event dispatch.
//!
//! The core of this system: interpret an untrusted inbound byte payload as a
//! Stripe event and route it to a typed handler without ever crashing on
//! malformed or unknown input.
//!
//! Per delivery the flow is a small state machine:
//!
//! ```text
//! Received -> EnvelopeDecoded -> PayloadDecoded -> Handled -> Acked
//!                             \-> Unrecognized ----------> Acked
//! ```
//!
//! with failure exits from the first two states (see [`DispatchError`]).
//! Nothing is retried and nothing persists across deliveries; Stripe owns
//! redelivery, and ordering between deliveries is neither guaranteed nor
//! required.

mod dispatcher;
mod envelope;
mod error;

pub use dispatcher::{DispatchOutcome, Event, EventDispatcher, EventHandler, NoopEventHandler};
pub use envelope::{EventEnvelope, EventEnvelopeData, EventType};
pub use error::DispatchError;
