//! # Client Configuration
//!
//! Configuration for the booking backend and payment processor clients.
//! All secrets are loaded from environment variables.

use checkout_core::CheckoutError;
use std::env;

/// Booking backend API configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the booking backend (e.g. https://api.example-transfers.com)
    pub base_url: String,

    /// Bearer token for the authenticated customer session
    pub api_token: String,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `BOOKING_API_BASE_URL`
    /// - `BOOKING_API_TOKEN`
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("BOOKING_API_BASE_URL").map_err(|_| {
            CheckoutError::Configuration("BOOKING_API_BASE_URL not set".to_string())
        })?;

        let api_token = env::var("BOOKING_API_TOKEN").map_err(|_| {
            CheckoutError::Configuration("BOOKING_API_TOKEN not set".to_string())
        })?;

        Self::new(base_url, api_token).validate()
    }

    /// Create config with explicit values (for testing)
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_token: api_token.into(),
        }
    }

    fn validate(self) -> Result<Self, CheckoutError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(CheckoutError::Configuration(
                "BOOKING_API_BASE_URL must start with http:// or https://".to_string(),
            ));
        }
        if self.api_token.trim().is_empty() {
            return Err(CheckoutError::Configuration(
                "BOOKING_API_TOKEN must not be empty".to_string(),
            ));
        }
        Ok(self)
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_token)
    }
}

/// Payment processor API configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,

    /// Payment method attached on headless confirmation
    pub payment_method: String,
}

impl ProcessorConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PROCESSOR_SECRET_KEY`
    ///
    /// Optional:
    /// - `PROCESSOR_PAYMENT_METHOD` (defaults to the test Visa method)
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok();

        let secret_key = env::var("PROCESSOR_SECRET_KEY").map_err(|_| {
            CheckoutError::Configuration("PROCESSOR_SECRET_KEY not set".to_string())
        })?;

        if !secret_key.starts_with("sk_test_") && !secret_key.starts_with("sk_live_") {
            return Err(CheckoutError::Configuration(
                "PROCESSOR_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        let payment_method = env::var("PROCESSOR_PAYMENT_METHOD")
            .unwrap_or_else(|_| "pm_card_visa".to_string());

        Ok(Self {
            secret_key,
            api_base_url: "https://api.stripe.com".to_string(),
            api_version: "2024-12-18.acacia".to_string(),
            payment_method,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base_url: "https://api.stripe.com".to_string(),
            api_version: "2024-12-18.acacia".to_string(),
            payment_method: "pm_card_visa".to_string(),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
