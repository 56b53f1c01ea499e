//! # Payment Intent Initializer
//!
//! Obtains a processor-side payment handle scoped to an existing booking.
//! Routing is purely by the `BookingInfo` tag; the two creation calls are
//! mutually exclusive. A handle is created at most once per booking: while a
//! valid handle exists, re-entering the payment step returns it without a
//! network call. Only a failed creation leaves the slot empty for a retry.

use checkout_core::{BookingInfo, CheckoutResult, PaymentGateway, PaymentHandle};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

pub struct PaymentIntentInitializer {
    gateway: Arc<dyn PaymentGateway>,
    handle: Mutex<Option<(BookingInfo, PaymentHandle)>>,
}

impl PaymentIntentInitializer {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            handle: Mutex::new(None),
        }
    }

    /// The handle held for this session, if one was created
    pub async fn handle(&self) -> Option<PaymentHandle> {
        self.handle.lock().await.as_ref().map(|(_, h)| h.clone())
    }

    /// Create (or return the existing) payment handle for `booking`.
    ///
    /// For a group booking `amount_pence` is the combined discounted total,
    /// not the sum of undiscounted legs — the caller passes the quote's
    /// charged total and this component does not recompute it.
    #[instrument(skip_all, fields(reference = booking.reference()))]
    pub async fn initialize(
        &self,
        booking: &BookingInfo,
        amount_pence: i64,
    ) -> CheckoutResult<PaymentHandle> {
        let mut slot = self.handle.lock().await;
        if let Some((held_for, handle)) = slot.as_ref() {
            if held_for == booking {
                debug!("reusing existing payment handle");
                return Ok(handle.clone());
            }
        }

        let handle = match booking {
            BookingInfo::Single { booking_id, .. } => {
                self.gateway
                    .create_payment_intent(*booking_id, amount_pence)
                    .await?
            }
            BookingInfo::Group {
                booking_group_id, ..
            } => {
                self.gateway
                    .create_group_payment_intent(*booking_group_id, amount_pence)
                    .await?
            }
        };

        *slot = Some((booking.clone(), handle.clone()));
        Ok(handle)
    }
}
