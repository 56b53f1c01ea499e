//! # Checkout Error Types
//!
//! Typed error handling for the checkout orchestration engine.
//! All checkout operations return `Result<T, CheckoutError>`.

use thiserror::Error;

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No priced quote snapshot exists for this session
    #[error("No priced quote found for this session")]
    MissingQuote,

    /// No authenticated customer identity available
    #[error("Customer is not signed in")]
    NotAuthenticated,

    /// The quote snapshot is structurally unusable
    #[error("Invalid quote: {0}")]
    InvalidQuote(String),

    /// Booking creation attempt ceiling reached; 0 attempts remain
    #[error("Booking could not be created after {ceiling} attempts; 0 attempts remaining")]
    MaxAttemptsExceeded { ceiling: u32 },

    /// Booking creation failed with attempts still remaining
    #[error("Booking creation failed: {message} ({attempts_remaining} attempts remaining)")]
    BookingFailed {
        message: String,
        attempts_remaining: u32,
    },

    /// A booking creation call is already outstanding
    #[error("A booking creation request is already in flight")]
    CreationInFlight,

    /// Payment intent could not be created
    #[error("Payment setup failed: {0}")]
    PaymentInit(String),

    /// The processor declined the payment method
    #[error("Payment declined: {reason}")]
    PaymentDeclined { reason: String },

    /// Backend or processor API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with a collaborator
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Status polling could not observe the booking at all
    #[error("Cannot confirm booking status right now: {0}")]
    StatusUnavailable(String),

    /// The checkout flow was cancelled by its caller
    #[error("Checkout cancelled")]
    Cancelled,

    /// Durable client-side store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The next action a user can sensibly take after an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Retry the failed step directly
    Retry,
    /// Explicitly reset the attempt counter, then retry
    ResetAndRetry,
    /// Go back to the quote-entry flow
    StartOver,
    /// Check back later; the state will catch up server-side
    Wait,
    /// No self-service recovery
    ContactSupport,
}

impl CheckoutError {
    /// Returns true if this error supports an immediate manual retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::BookingFailed { .. }
                | CheckoutError::PaymentInit(_)
                | CheckoutError::PaymentDeclined { .. }
                | CheckoutError::NetworkError(_)
                | CheckoutError::ProviderError { .. }
        )
    }

    /// Map the error to the action surfaced next to the message
    pub fn next_action(&self) -> NextAction {
        match self {
            CheckoutError::MissingQuote
            | CheckoutError::NotAuthenticated
            | CheckoutError::InvalidQuote(_) => NextAction::StartOver,
            CheckoutError::MaxAttemptsExceeded { .. } => NextAction::ResetAndRetry,
            CheckoutError::BookingFailed { .. }
            | CheckoutError::PaymentInit(_)
            | CheckoutError::PaymentDeclined { .. }
            | CheckoutError::NetworkError(_)
            | CheckoutError::ProviderError { .. } => NextAction::Retry,
            CheckoutError::StatusUnavailable(_) => NextAction::Wait,
            CheckoutError::CreationInFlight | CheckoutError::Cancelled => NextAction::Wait,
            CheckoutError::Storage(_)
            | CheckoutError::Serialization(_)
            | CheckoutError::Configuration(_)
            | CheckoutError::Internal(_) => NextAction::ContactSupport,
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
