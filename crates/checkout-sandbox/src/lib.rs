//! # checkout-sandbox
//!
//! In-memory booking backend sandbox for transfer-checkout-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server with the booking backend's REST surface
//! - In-memory booking and booking-group storage
//! - A simulated settlement webhook (delayed paid-status flip)
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/bookings` | Create a single booking |
//! | POST | `/api/v1/bookings/return` | Create a linked return pair |
//! | GET | `/api/v1/bookings/:id` | Fetch a booking |
//! | GET | `/api/v1/booking-groups/:id` | Fetch a group |
//! | POST | `/api/v1/payments/intents` | Create a payment intent |
//! | POST | `/api/v1/payments/group-intents` | Create a group intent |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
