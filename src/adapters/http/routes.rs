//! Route definitions for the API surface.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    create_checkout, get_payment_intent, get_success, handle_webhook, AppState,
};

/// Build the API router.
///
/// Routes:
/// - `GET|POST /checkout` - create a checkout session and redirect to it
/// - `GET /success` - read back a completed session by query parameter
/// - `GET /payment_intent/:id` - fetch a payment intent
/// - `POST /webhook` - receive asynchronous provider events
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(create_checkout).post(create_checkout))
        .route("/success", get(get_success))
        .route("/payment_intent/:id", get(get_payment_intent))
        .route("/webhook", post(handle_webhook))
}
