//! # Retry-Bounded Booking Creator
//!
//! Turns a quote snapshot into exactly one persisted booking (or one linked
//! outbound/return pair), refusing to exceed the global attempt ceiling even
//! across reloads, and never double-creating once a booking exists.
//!
//! The attempt counter is incremented and persisted *before* the network
//! call: a crash mid-request still consumes an attempt, since the server
//! side-effect may have succeeded even though the client never observed it.

use checkout_core::{
    BookingApi, BookingInfo, BookingPayload, CheckoutError, CheckoutResult, CustomerIdentity,
    QuoteSnapshot, ReturnBookingPayload, RetryStateStore, MAX_BOOKING_ATTEMPTS,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

/// Clears the in-flight flag when the creation attempt resolves, on any path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct BookingCreator {
    api: Arc<dyn BookingApi>,
    retry: Arc<dyn RetryStateStore>,
    in_flight: AtomicBool,
    booked: Mutex<Option<BookingInfo>>,
}

impl BookingCreator {
    pub fn new(api: Arc<dyn BookingApi>, retry: Arc<dyn RetryStateStore>) -> Self {
        Self {
            api,
            retry,
            in_flight: AtomicBool::new(false),
            booked: Mutex::new(None),
        }
    }

    /// The booking recorded for this session, if creation already succeeded
    pub fn booking(&self) -> Option<BookingInfo> {
        self.booked.lock().expect("booked lock").clone()
    }

    /// Attempts left before the ceiling, per the persisted counter
    pub fn attempts_remaining(&self) -> CheckoutResult<u32> {
        Ok(self.retry.load()?.remaining())
    }

    /// Explicit user-initiated reset after the ceiling was reached.
    ///
    /// Re-zeroes the persisted counter so the same creation path can be
    /// re-entered. Does not touch an already-recorded booking.
    pub fn reset_attempts(&self) -> CheckoutResult<()> {
        self.retry.clear()
    }

    /// Create the booking for this checkout session.
    ///
    /// Preconditions checked before any network call, in order: a booking
    /// already recorded short-circuits to it; a second concurrent trigger is
    /// suppressed by the in-flight flag; a spent ceiling is rejected
    /// locally. Exactly one creation request is issued per invocation that
    /// passes all three.
    #[instrument(skip_all, fields(journey = ?quote.journey))]
    pub async fn create(
        &self,
        quote: &QuoteSnapshot,
        customer: &CustomerIdentity,
    ) -> CheckoutResult<BookingInfo> {
        if let Some(existing) = self.booking() {
            // Never invoke the backend twice for one session
            return Ok(existing);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("duplicate booking-creation trigger suppressed");
            return Err(CheckoutError::CreationInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let mut state = self.retry.load()?;
        if state.exhausted() {
            return Err(CheckoutError::MaxAttemptsExceeded {
                ceiling: MAX_BOOKING_ATTEMPTS,
            });
        }

        // Pessimistic accounting: persist the spent attempt first
        state.record_attempt();
        self.retry.save(state)?;

        let result = if quote.is_return() {
            let payload = ReturnBookingPayload::from_quote(quote, customer)?;
            self.api
                .create_return_booking(&payload)
                .await
                .map(|group| BookingInfo::Group {
                    booking_group_id: group.id,
                    group_reference: group.group_reference,
                })
        } else {
            let payload = BookingPayload::from_quote(quote, customer);
            self.api
                .create_booking(&payload)
                .await
                .map(|booking| BookingInfo::Single {
                    booking_id: booking.id,
                    booking_reference: booking.booking_reference,
                })
        };

        match result {
            Ok(info) => {
                // A successful creation forgives prior failed attempts
                self.retry.clear()?;
                *self.booked.lock().expect("booked lock") = Some(info.clone());
                info!(reference = info.reference(), "booking created");
                Ok(info)
            }
            Err(e) => {
                let remaining = state.remaining();
                warn!(error = %e, remaining, "booking creation failed");
                if remaining > 0 {
                    Err(CheckoutError::BookingFailed {
                        message: e.to_string(),
                        attempts_remaining: remaining,
                    })
                } else {
                    Err(CheckoutError::MaxAttemptsExceeded {
                        ceiling: MAX_BOOKING_ATTEMPTS,
                    })
                }
            }
        }
    }
}
