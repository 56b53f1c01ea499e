//! # Collaborator Seams
//!
//! Traits for the three independently failing systems the checkout flow
//! orchestrates — the booking backend, the payment processor, and the
//! durable client-side stores. The engine depends only on these traits;
//! concrete implementations live in `checkout-client` (REST) and
//! `checkout-flow` (stores), with mocks in tests.

use crate::booking::{
    Booking, BookingGroup, BookingPayload, PaymentHandle, ReturnBookingPayload,
};
use crate::error::CheckoutResult;
use crate::quote::{CustomerIdentity, QuoteSnapshot};
use crate::retry::RetryState;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Booking backend REST surface consumed by the checkout flow
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Create one persisted booking from a single-journey payload
    async fn create_booking(&self, payload: &BookingPayload) -> CheckoutResult<Booking>;

    /// Atomically create a linked outbound/return pair as one unit
    async fn create_return_booking(
        &self,
        payload: &ReturnBookingPayload,
    ) -> CheckoutResult<BookingGroup>;

    /// Re-read a booking, primarily for webhook-confirmation polling
    async fn booking(&self, id: Uuid) -> CheckoutResult<Booking>;

    /// Re-read a booking group with all member legs
    async fn booking_group(&self, id: Uuid) -> CheckoutResult<BookingGroup>;
}

/// Processor-side payment intent creation, routed by booking shape
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        booking_id: Uuid,
        amount_pence: i64,
    ) -> CheckoutResult<PaymentHandle>;

    async fn create_group_payment_intent(
        &self,
        booking_group_id: Uuid,
        amount_pence: i64,
    ) -> CheckoutResult<PaymentHandle>;
}

/// Outcome of handing a payment handle to the processor.
///
/// `Confirmed` is provisional: the processor accepted the payment method,
/// but the authoritative paid state only arrives later via a server-side
/// webhook. That gap is what the confirmation poller bridges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed { payment_intent_id: String },
    Declined { message: String },
}

/// Bridge to the payment processor's payment-collection surface.
///
/// In the browser this is the processor's client SDK (card entry, 3-D
/// Secure, redirect suppressed where supported); headless deployments use
/// the REST confirmer in `checkout-client`.
#[async_trait]
pub trait PaymentConfirmer: Send + Sync {
    async fn confirm(&self, handle: &PaymentHandle) -> CheckoutResult<ConfirmOutcome>;
}

/// Durable slot holding the priced quote across navigation and reload
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> CheckoutResult<Option<QuoteSnapshot>>;
    fn save(&self, snapshot: &QuoteSnapshot) -> CheckoutResult<()>;
    /// Invoked only after terminal success, preventing replay of a stale quote
    fn clear(&self) -> CheckoutResult<()>;
}

/// Durable slot holding the booking-creation attempt counter.
///
/// The contract the booking creator relies on: the counter is saved before
/// the network call (pessimistic pre-increment) and cleared on success.
pub trait RetryStateStore: Send + Sync {
    fn load(&self) -> CheckoutResult<RetryState>;
    fn save(&self, state: RetryState) -> CheckoutResult<()>;
    fn clear(&self) -> CheckoutResult<()>;
}

/// Session service seam: who is checking out
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<CustomerIdentity>;
}

/// Type aliases for shared trait objects (dynamic dispatch)
pub type BoxedBookingApi = Arc<dyn BookingApi>;
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
pub type BoxedPaymentConfirmer = Arc<dyn PaymentConfirmer>;
