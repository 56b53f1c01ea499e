//! # Retry State
//!
//! The persisted booking-creation attempt counter. This is the only state
//! shared across page loads: it is incremented and persisted immediately
//! before each creation attempt (pessimistic accounting — a crash mid-call
//! still consumes an attempt) and reset on the first successful creation.

use serde::{Deserialize, Serialize};

/// Global ceiling on booking-creation attempts per checkout session
pub const MAX_BOOKING_ATTEMPTS: u32 = 3;

/// Attempts-used counter, persisted outside in-memory state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryState {
    pub attempts: u32,
}

impl RetryState {
    pub fn remaining(&self) -> u32 {
        MAX_BOOKING_ATTEMPTS.saturating_sub(self.attempts)
    }

    pub fn exhausted(&self) -> bool {
        self.attempts >= MAX_BOOKING_ATTEMPTS
    }

    /// Consume one attempt. Called before the network request is issued.
    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Forgive prior failed attempts after a successful creation
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
