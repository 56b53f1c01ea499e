//! # checkout-core
//!
//! Core types and traits for the transfer-checkout orchestration engine.
//!
//! This crate provides:
//! - `QuoteSnapshot` and friends: the frozen, priced journey description
//! - `BookingInfo`, `Booking`, `BookingGroup`: backend booking shapes
//! - `PaymentHandle` and the `PaymentConfirmer`/`PaymentGateway` seams
//! - `RetryState`: the reload-surviving attempt counter
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{BookingPayload, QuoteSnapshot};
//!
//! // Load the priced quote captured by the quote flow
//! let quote: QuoteSnapshot = store.load()?.ok_or(CheckoutError::MissingQuote)?;
//!
//! // Turn it into a creation payload for the booking backend
//! let payload = BookingPayload::from_quote(&quote, &customer);
//! let booking = api.create_booking(&payload).await?;
//! ```

pub mod api;
pub mod booking;
pub mod error;
pub mod quote;
pub mod retry;

// Re-exports for convenience
pub use api::{
    BookingApi, BoxedBookingApi, BoxedPaymentConfirmer, BoxedPaymentGateway, ConfirmOutcome,
    IdentityProvider, PaymentConfirmer, PaymentGateway, RetryStateStore, SnapshotStore,
};
pub use booking::{
    Booking, BookingGroup, BookingInfo, BookingLeg, BookingPayload, BookingStatus, PaymentHandle,
    PollAttempt, ReturnBookingPayload,
};
pub use error::{CheckoutError, CheckoutResult, NextAction};
pub use quote::{
    AddOns, CustomerContact, CustomerIdentity, JourneyType, Location, PriceBreakdown,
    QuoteSnapshot, ServiceType, VehicleType,
};
pub use retry::{RetryState, MAX_BOOKING_ATTEMPTS};
