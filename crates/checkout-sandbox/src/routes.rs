//! # Routes
//!
//! Axum router configuration for the sandbox backend.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - POST /api/v1/bookings - Create a single booking
/// - POST /api/v1/bookings/return - Create a linked outbound/return pair
/// - GET  /api/v1/bookings/{id} - Fetch a booking
/// - GET  /api/v1/booking-groups/{id} - Fetch a group with member legs
/// - POST /api/v1/payments/intents - Create an intent for one booking
/// - POST /api/v1/payments/group-intents - Create an intent for a group
pub fn create_router(state: AppState) -> Router {
    // Browser checkout pages call this from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let booking_routes = Router::new()
        .route("/bookings", post(handlers::create_booking))
        .route("/bookings/return", post(handlers::create_return_booking))
        .route("/bookings/{id}", get(handlers::get_booking))
        .route("/booking-groups/{id}", get(handlers::get_booking_group));

    let payment_routes = Router::new()
        .route("/payments/intents", post(handlers::create_payment_intent))
        .route(
            "/payments/group-intents",
            post(handlers::create_group_payment_intent),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", booking_routes.merge(payment_routes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
