//! # Checkout State Machine
//!
//! Composes the snapshot store, booking creator, intent initializer,
//! confirmation bridge and webhook poller into one linear flow:
//!
//! ```text
//! LoadingQuote → Authenticating → CreatingBooking → InitializingPayment
//!     → ConfirmingPayment → PollingConfirmation → Succeeded
//! ```
//!
//! `CreatingBooking` can loop back on itself below the attempt ceiling, and
//! any phase can drop to `Failed`. No phase starts before the previous one
//! resolves. Phase changes are published on a watch channel so the hosting
//! view can render a distinct loading affordance per phase.

use crate::creator::BookingCreator;
use crate::intent::PaymentIntentInitializer;
use crate::poller::{poll_until, PollConfig, PollOutcome};
use checkout_core::{
    BookingApi, BookingInfo, CheckoutError, CheckoutResult, ConfirmOutcome, IdentityProvider,
    PaymentConfirmer, PaymentGateway, PaymentHandle, PollAttempt, RetryStateStore, SnapshotStore,
};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// The phases of one checkout run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    LoadingQuote,
    Authenticating,
    CreatingBooking,
    InitializingPayment,
    ConfirmingPayment,
    PollingConfirmation,
    Succeeded,
    Failed,
}

impl CheckoutPhase {
    /// Progress narrative shown while the phase is active
    pub fn describe(&self) -> &'static str {
        match self {
            CheckoutPhase::LoadingQuote => "Loading your quote",
            CheckoutPhase::Authenticating => "Checking your account",
            CheckoutPhase::CreatingBooking => "Creating your booking",
            CheckoutPhase::InitializingPayment => "Setting up payment",
            CheckoutPhase::ConfirmingPayment => "Confirming payment",
            CheckoutPhase::PollingConfirmation => "Waiting for payment confirmation",
            CheckoutPhase::Succeeded => "Booking confirmed",
            CheckoutPhase::Failed => "Checkout failed",
        }
    }
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Terminal result of a successful run.
///
/// `verified_paid` is false on the graceful-timeout path: the processor
/// accepted payment but the webhook had not landed within the poll budget.
/// The backend state catches up server-side and is reflected the next time
/// the customer views the booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub booking: BookingInfo,
    pub verified_paid: bool,
}

pub struct CheckoutFlow {
    snapshots: Arc<dyn SnapshotStore>,
    identity: Arc<dyn IdentityProvider>,
    api: Arc<dyn BookingApi>,
    creator: BookingCreator,
    intents: PaymentIntentInitializer,
    confirmer: Arc<dyn PaymentConfirmer>,
    poll: PollConfig,
    phase_tx: watch::Sender<CheckoutPhase>,
}

impl CheckoutFlow {
    pub fn new(
        api: Arc<dyn BookingApi>,
        gateway: Arc<dyn PaymentGateway>,
        confirmer: Arc<dyn PaymentConfirmer>,
        snapshots: Arc<dyn SnapshotStore>,
        retry: Arc<dyn RetryStateStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(CheckoutPhase::LoadingQuote);
        Self {
            snapshots,
            identity,
            creator: BookingCreator::new(api.clone(), retry),
            api,
            intents: PaymentIntentInitializer::new(gateway),
            confirmer,
            poll: PollConfig::default(),
            phase_tx,
        }
    }

    /// Override the polling timings (tests, local sandbox)
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Subscribe to phase changes for progress display
    pub fn phases(&self) -> watch::Receiver<CheckoutPhase> {
        self.phase_tx.subscribe()
    }

    /// The phase the flow is currently in
    pub fn phase(&self) -> CheckoutPhase {
        *self.phase_tx.borrow()
    }

    /// The booking recorded for this session, if creation already succeeded
    pub fn booking(&self) -> Option<BookingInfo> {
        self.creator.booking()
    }

    /// The payment handle held for this session, if one was created
    pub async fn payment_handle(&self) -> Option<PaymentHandle> {
        self.intents.handle().await
    }

    /// Booking-creation attempts left before the ceiling
    pub fn attempts_remaining(&self) -> CheckoutResult<u32> {
        self.creator.attempts_remaining()
    }

    /// Explicit "try again" after the ceiling was reached: re-zeroes the
    /// persisted counter so `run` can re-enter the creation path
    pub fn reset_attempts(&self) -> CheckoutResult<()> {
        self.creator.reset_attempts()
    }

    /// Drive the checkout to a terminal state.
    ///
    /// Re-runnable after a recoverable failure: already-completed phases
    /// short-circuit (the creator returns its recorded booking, the intent
    /// initializer returns its cached handle), so a manual retry resumes at
    /// the step that failed instead of repeating side effects.
    pub async fn run(&self, cancel: &CancellationToken) -> CheckoutResult<CheckoutOutcome> {
        self.run_with_observer(cancel, |_| {}).await
    }

    /// `run`, reporting each numbered poll attempt to `observer`
    #[instrument(skip_all)]
    pub async fn run_with_observer(
        &self,
        cancel: &CancellationToken,
        observer: impl FnMut(PollAttempt),
    ) -> CheckoutResult<CheckoutOutcome> {
        let result = self.drive(cancel, observer).await;
        match &result {
            // After cancellation the hosting view is gone; leave all state
            // untouched rather than publishing to nobody.
            Err(CheckoutError::Cancelled) => {}
            Err(error) => {
                info!(%error, action = ?error.next_action(), "checkout failed");
                self.enter(CheckoutPhase::Failed);
            }
            Ok(outcome) => {
                info!(
                    reference = outcome.booking.reference(),
                    verified_paid = outcome.verified_paid,
                    "checkout complete"
                );
            }
        }
        result
    }

    async fn drive(
        &self,
        cancel: &CancellationToken,
        mut observer: impl FnMut(PollAttempt),
    ) -> CheckoutResult<CheckoutOutcome> {
        self.enter(CheckoutPhase::LoadingQuote);
        let quote = self.snapshots.load()?.ok_or(CheckoutError::MissingQuote)?;

        self.enter(CheckoutPhase::Authenticating);
        let customer = self
            .identity
            .current()
            .ok_or(CheckoutError::NotAuthenticated)?;

        self.enter(CheckoutPhase::CreatingBooking);
        let booking = self.creator.create(&quote, &customer).await?;

        self.enter(CheckoutPhase::InitializingPayment);
        // For a return group this is the combined discounted total, not the
        // sum of undiscounted legs
        let handle = self
            .intents
            .initialize(&booking, quote.price.total_pence)
            .await?;

        self.enter(CheckoutPhase::ConfirmingPayment);
        match self.confirmer.confirm(&handle).await? {
            ConfirmOutcome::Confirmed { .. } => {}
            ConfirmOutcome::Declined { message } => {
                return Err(CheckoutError::PaymentDeclined { reason: message })
            }
        }

        self.enter(CheckoutPhase::PollingConfirmation);
        let outcome = self.poll_paid(&booking, cancel, &mut observer).await?;

        let verified_paid = match outcome {
            PollOutcome::Confirmed(()) => true,
            PollOutcome::Cancelled => return Err(CheckoutError::Cancelled),
            PollOutcome::TimedOut => {
                // Graceful degradation: the processor already accepted the
                // payment method, so a late webhook is treated as success
                // after a short "payment received, processing" pause.
                info!("payment received, webhook confirmation still pending");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(CheckoutError::Cancelled),
                    _ = sleep(self.poll.grace_delay) => {}
                }
                false
            }
        };

        self.enter(CheckoutPhase::Succeeded);
        // Terminal success consumes the quote: a stale snapshot must never
        // replay into a new booking
        self.snapshots.clear()?;

        Ok(CheckoutOutcome {
            booking,
            verified_paid,
        })
    }

    async fn poll_paid(
        &self,
        booking: &BookingInfo,
        cancel: &CancellationToken,
        observer: &mut impl FnMut(PollAttempt),
    ) -> CheckoutResult<PollOutcome<()>> {
        let result = match booking {
            BookingInfo::Single { booking_id, .. } => {
                let api = Arc::clone(&self.api);
                let id = *booking_id;
                poll_until(
                    &self.poll,
                    cancel,
                    move || {
                        let api = api.clone();
                        async move { api.booking(id).await }
                    },
                    |booking| booking.is_paid(),
                    observer,
                )
                .await
                .map(|outcome| outcome.map(|_| ()))
            }
            BookingInfo::Group {
                booking_group_id, ..
            } => {
                let api = Arc::clone(&self.api);
                let id = *booking_group_id;
                poll_until(
                    &self.poll,
                    cancel,
                    move || {
                        let api = api.clone();
                        async move { api.booking_group(id).await }
                    },
                    // Every leg in the group must report paid
                    |group| group.is_paid(),
                    observer,
                )
                .await
                .map(|outcome| outcome.map(|_| ()))
            }
        };

        // A fetch failure means status cannot be observed at all — more
        // severe than "not yet updated", and distinct from timeout
        result.map_err(|e| CheckoutError::StatusUnavailable(e.to_string()))
    }

    fn enter(&self, phase: CheckoutPhase) {
        self.phase_tx.send_replace(phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCheckoutStore;
    use crate::testutil::{customer, sample_quote, MockBackend, MockConfirmer, MockGateway, StaticIdentity};
    use checkout_core::JourneyType;

    struct Harness {
        flow: CheckoutFlow,
        backend: Arc<MockBackend>,
        gateway: Arc<MockGateway>,
        store: Arc<MemoryCheckoutStore>,
    }

    fn harness(
        backend: MockBackend,
        confirmer: MockConfirmer,
        quote: Option<checkout_core::QuoteSnapshot>,
        signed_in: bool,
    ) -> Harness {
        let backend = Arc::new(backend);
        let gateway = Arc::new(MockGateway::new());
        let store = Arc::new(match quote {
            Some(quote) => MemoryCheckoutStore::with_snapshot(quote),
            None => MemoryCheckoutStore::new(),
        });
        let identity = Arc::new(StaticIdentity(signed_in.then(customer)));
        let flow = CheckoutFlow::new(
            backend.clone(),
            gateway.clone(),
            Arc::new(confirmer),
            store.clone(),
            store.clone(),
            identity,
        );
        Harness {
            flow,
            backend,
            gateway,
            store,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_path_single_journey() {
        let h = harness(
            MockBackend::new(),
            MockConfirmer::Accepting,
            Some(sample_quote(JourneyType::Single)),
            true,
        );

        let outcome = h.flow.run(&CancellationToken::new()).await.unwrap();

        assert!(matches!(outcome.booking, BookingInfo::Single { .. }));
        assert!(outcome.verified_paid);
        assert_eq!(h.flow.phase(), CheckoutPhase::Succeeded);
        assert_eq!(h.backend.create_calls(), 1);
        assert_eq!(h.gateway.intent_calls(), 1);
        // Quote slot consumed on terminal success
        assert!(SnapshotStore::load(h.store.as_ref()).unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_path_return_group() {
        let h = harness(
            MockBackend::new().paid_from_fetch(3),
            MockConfirmer::Accepting,
            Some(sample_quote(JourneyType::Return)),
            true,
        );

        let mut attempts = Vec::new();
        let outcome = h
            .flow
            .run_with_observer(&CancellationToken::new(), |a| attempts.push(a))
            .await
            .unwrap();

        assert!(matches!(outcome.booking, BookingInfo::Group { .. }));
        assert!(outcome.verified_paid);
        assert_eq!(attempts.len(), 3);
        assert!(attempts[2].paid);
        assert_eq!(h.backend.status_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_quote_is_a_hard_redirect() {
        let h = harness(MockBackend::new(), MockConfirmer::Accepting, None, true);

        let err = h.flow.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::MissingQuote));
        assert_eq!(h.flow.phase(), CheckoutPhase::Failed);
        assert_eq!(h.backend.create_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_out_customer_cannot_check_out() {
        let h = harness(
            MockBackend::new(),
            MockConfirmer::Accepting,
            Some(sample_quote(JourneyType::Single)),
            false,
        );

        let err = h.flow.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotAuthenticated));
        assert_eq!(h.backend.create_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_payment_keeps_quote_for_retry() {
        let h = harness(
            MockBackend::new(),
            MockConfirmer::Declining("card_declined"),
            Some(sample_quote(JourneyType::Single)),
            true,
        );

        let err = h.flow.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentDeclined { .. }));
        assert_eq!(h.flow.phase(), CheckoutPhase::Failed);
        // Not terminal success: the snapshot must survive for the retry
        assert!(SnapshotStore::load(h.store.as_ref()).unwrap().is_some());
        assert!(h.flow.booking().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerun_after_decline_repeats_no_side_effects() {
        let h = harness(
            MockBackend::new(),
            MockConfirmer::Declining("card_declined"),
            Some(sample_quote(JourneyType::Single)),
            true,
        );
        h.flow.run(&CancellationToken::new()).await.unwrap_err();

        // The retry fails at the same step but reuses booking and handle
        h.flow.run(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(h.backend.create_calls(), 1);
        assert_eq!(h.gateway.intent_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_graceful_timeout_reaches_success() {
        let h = harness(
            // Webhook never lands inside the poll budget
            MockBackend::new().paid_from_fetch(u32::MAX),
            MockConfirmer::Accepting,
            Some(sample_quote(JourneyType::Single)),
            true,
        );

        let outcome = h.flow.run(&CancellationToken::new()).await.unwrap();

        assert!(!outcome.verified_paid);
        assert_eq!(h.flow.phase(), CheckoutPhase::Succeeded);
        assert_eq!(h.backend.status_calls(), 30);
        assert!(SnapshotStore::load(h.store.as_ref()).unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_outage_is_distinct_from_timeout() {
        let h = harness(
            MockBackend::new().with_status_failure(),
            MockConfirmer::Accepting,
            Some(sample_quote(JourneyType::Single)),
            true,
        );

        let err = h.flow.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::StatusUnavailable(_)));
        assert_eq!(h.flow.phase(), CheckoutPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_mid_poll_leaves_state_untouched() {
        let h = harness(
            MockBackend::new().paid_from_fetch(u32::MAX),
            MockConfirmer::Accepting,
            Some(sample_quote(JourneyType::Single)),
            true,
        );
        let token = CancellationToken::new();
        token.cancel();

        let err = h.flow.run(&token).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Cancelled));
        // No Failed transition and no snapshot mutation after teardown
        assert_eq!(h.flow.phase(), CheckoutPhase::PollingConfirmation);
        assert!(SnapshotStore::load(h.store.as_ref()).unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_updates_reach_subscribers() {
        let h = harness(
            MockBackend::new(),
            MockConfirmer::Accepting,
            Some(sample_quote(JourneyType::Single)),
            true,
        );
        let rx = h.flow.phases();

        h.flow.run(&CancellationToken::new()).await.unwrap();
        assert_eq!(*rx.borrow(), CheckoutPhase::Succeeded);
        assert_eq!(CheckoutPhase::Succeeded.describe(), "Booking confirmed");
    }
}
