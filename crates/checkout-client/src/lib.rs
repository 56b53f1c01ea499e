//! # checkout-client
//!
//! REST implementations of the checkout collaborator seams:
//! - `RestBookingClient` — booking backend (`BookingApi` + `PaymentGateway`)
//! - `RestPaymentConfirmer` — processor confirmation (`PaymentConfirmer`)
//!
//! Configuration is environment-driven; see `BackendConfig` and
//! `ProcessorConfig` for the variables each client reads.

pub mod config;
pub mod confirm;
pub mod rest;

pub use config::{BackendConfig, ProcessorConfig};
pub use confirm::RestPaymentConfirmer;
pub use rest::RestBookingClient;
