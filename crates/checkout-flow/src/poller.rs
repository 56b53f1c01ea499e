//! # Webhook-Confirmation Poller
//!
//! Bridges the gap between "processor confirmed" and "backend recorded as
//! paid". The paid state is set by a server-side webhook the client cannot
//! subscribe to, so the flow re-reads booking status at a fixed interval
//! until a predicate holds or the attempt budget runs out.
//!
//! The loop is an explicit future-based iteration with a cancellation token
//! rather than nested timer callbacks: one `PollAttempt` is reported per
//! iteration, and the loop terminates on predicate-true, ceiling-exhausted,
//! or token-fired, whichever comes first.

use checkout_core::{CheckoutResult, PollAttempt};
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Timing parameters for one polling run
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before each status fetch
    pub interval: Duration,
    /// Attempt budget; bounds the total wait to `interval * max_attempts`
    pub max_attempts: u32,
    /// Pause shown with the "payment received, processing" message before a
    /// graceful timeout proceeds to success
    pub grace_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 30,
            grace_delay: Duration::from_millis(3000),
        }
    }
}

/// How a polling run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The predicate held; carries the last fetched value
    Confirmed(T),
    /// Budget exhausted without the predicate holding. Deliberately not an
    /// error: the processor already provisionally confirmed payment, so a
    /// slow webhook is backend latency, not evidence of failure.
    TimedOut,
    /// The caller tore down; no further fetches were issued
    Cancelled,
}

impl<T> PollOutcome<T> {
    /// Map the confirmed value, leaving the other outcomes untouched
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> PollOutcome<U> {
        match self {
            PollOutcome::Confirmed(value) => PollOutcome::Confirmed(f(value)),
            PollOutcome::TimedOut => PollOutcome::TimedOut,
            PollOutcome::Cancelled => PollOutcome::Cancelled,
        }
    }
}

/// Repeatedly fetch until `predicate` holds, the budget runs out, or the
/// token fires. Fetch errors terminate the run early and propagate — the
/// caller treats "cannot observe status" as distinct from "not paid yet".
pub async fn poll_until<T, F, Fut, P, O>(
    config: &PollConfig,
    cancel: &CancellationToken,
    mut fetch: F,
    predicate: P,
    mut observer: O,
) -> CheckoutResult<PollOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CheckoutResult<T>>,
    P: Fn(&T) -> bool,
    O: FnMut(PollAttempt),
{
    for number in 1..=config.max_attempts {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(attempt = number, "polling cancelled by caller");
                return Ok(PollOutcome::Cancelled);
            }
            _ = sleep(config.interval) => {}
        }

        let value = fetch().await?;
        let paid = predicate(&value);
        observer(PollAttempt {
            number,
            at: Utc::now(),
            paid,
        });
        debug!(attempt = number, paid, "status fetched");

        if paid {
            return Ok(PollOutcome::Confirmed(value));
        }
    }

    Ok(PollOutcome::TimedOut)
}
