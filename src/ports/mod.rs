//! Ports - boundary contracts to external collaborators.

mod payment_provider;

pub use payment_provider::{
    CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider,
};
