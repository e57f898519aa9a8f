//! HTTP adapter - the server's REST surface.

mod dto;
mod handlers;
mod routes;

pub use dto::ErrorResponse;
pub use handlers::{ApiError, AppState, CheckoutOptions, MAX_WEBHOOK_BODY_BYTES};
pub use routes::api_router;
