//! # checkout-flow
//!
//! The checkout orchestration engine for transfer-checkout-rs.
//!
//! This crate turns a priced quote into a paid, confirmed booking across
//! three independently failing systems — the booking API, the payment
//! processor, and an asynchronous webhook the client cannot observe — while
//! surviving reloads, duplicate submissions and webhook delay.
//!
//! It provides:
//! - `CheckoutFlow`: the linear state machine driving one checkout run
//! - `BookingCreator`: retry-bounded, reload-surviving booking creation
//! - `PaymentIntentInitializer`: at-most-one payment handle per booking
//! - `poll_until`: the cancellable webhook-confirmation polling loop
//! - `MemoryCheckoutStore`/`FileCheckoutStore`: durable session slots
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_flow::{CheckoutFlow, FileCheckoutStore};
//! use tokio_util::sync::CancellationToken;
//!
//! let store = Arc::new(FileCheckoutStore::new(state_dir, session_id)?);
//! let flow = CheckoutFlow::new(api, gateway, confirmer, store.clone(), store, identity);
//!
//! let cancel = CancellationToken::new();
//! let outcome = flow.run(&cancel).await?;
//! println!("booked: {}", outcome.booking.reference());
//! ```

pub mod creator;
pub mod flow;
pub mod intent;
pub mod poller;
pub mod store;

#[cfg(test)]
mod testutil;

// Re-exports for convenience
pub use creator::BookingCreator;
pub use flow::{CheckoutFlow, CheckoutOutcome, CheckoutPhase};
pub use intent::PaymentIntentInitializer;
pub use poller::{poll_until, PollConfig, PollOutcome};
pub use store::{FileCheckoutStore, MemoryCheckoutStore};
