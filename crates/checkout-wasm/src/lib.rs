//! # checkout-wasm
//!
//! WebAssembly bindings for transfer-checkout-rs.
//!
//! This crate provides WASM-compatible functions for the browser checkout
//! page:
//! - Validating a stored quote snapshot before entering checkout
//! - Price and poll-progress formatting
//! - The special-requirements preview shown on the review step
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { validate_quote, format_price } from 'transfer-checkout-wasm';
//!
//! await init();
//!
//! const summary = validate_quote(sessionStorage.getItem('quote'));
//! console.log('Paying:', format_price(summary.total_pence));
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use checkout_core::{JourneyType, QuoteSnapshot};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// What the checkout page needs from a validated quote
#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub is_return: bool,
    pub passengers: u32,
    pub total_pence: i64,
    pub discount_pence: i64,
    pub special_requirements: Option<String>,
}

/// Parse and validate a stored quote snapshot.
///
/// Returns the summary the page renders, or an error string describing why
/// the snapshot cannot enter checkout (the page then redirects to the quote
/// form).
#[wasm_bindgen]
pub fn validate_quote(json: &str) -> Result<JsValue, JsValue> {
    let quote: QuoteSnapshot = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid quote snapshot: {}", e)))?;

    if quote.price.total_pence <= 0 {
        return Err(JsValue::from_str("Quote has no payable total"));
    }
    if quote.journey == JourneyType::Return && quote.return_at.is_none() {
        return Err(JsValue::from_str("Return journey has no return time"));
    }

    let summary = QuoteSummary {
        is_return: quote.journey == JourneyType::Return,
        passengers: quote.passengers,
        total_pence: quote.price.total_pence,
        discount_pence: quote.price.discount_pence,
        special_requirements: quote.special_requirements(),
    };

    serde_wasm_bindgen::to_value(&summary)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Format a price in pence to display string
#[wasm_bindgen]
pub fn format_price(pence: i64) -> String {
    format!("£{:.2}", pence as f64 / 100.0)
}

/// Progress label shown while waiting for payment confirmation
#[wasm_bindgen]
pub fn poll_progress_label(attempt: u32, max_attempts: u32) -> String {
    if attempt >= max_attempts {
        "Payment received, processing your booking...".to_string()
    } else {
        format!(
            "Waiting for payment confirmation ({}/{})",
            attempt, max_attempts
        )
    }
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
