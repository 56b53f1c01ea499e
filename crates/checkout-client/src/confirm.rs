//! # Processor Confirmation Client
//!
//! Headless server-side confirmation of a payment intent against the
//! processor's REST API. The outcome is provisional: "confirmed" here means
//! the processor accepted the charge, not that the booking backend has
//! recorded it as paid — that arrives later via webhook and is observed by
//! the polling loop.

use crate::config::ProcessorConfig;
use async_trait::async_trait;
use checkout_core::{
    CheckoutError, CheckoutResult, ConfirmOutcome, PaymentConfirmer, PaymentHandle,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

/// Confirms payment intents directly with the processor
pub struct RestPaymentConfirmer {
    config: ProcessorConfig,
    client: Client,
}

impl RestPaymentConfirmer {
    /// Create a new confirmer over the given processor config
    pub fn new(config: ProcessorConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        let config = ProcessorConfig::from_env()?;
        Ok(Self::new(config))
    }
}

#[async_trait]
impl PaymentConfirmer for RestPaymentConfirmer {
    #[instrument(skip_all, fields(intent = %handle.payment_intent_id))]
    async fn confirm(&self, handle: &PaymentHandle) -> CheckoutResult<ConfirmOutcome> {
        let url = format!(
            "{}/v1/payment_intents/{}/confirm",
            self.config.api_base_url, handle.payment_intent_id
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&[("payment_method", self.config.payment_method.as_str())])
            .send()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            if let Ok(failure) = serde_json::from_str::<ProcessorErrorResponse>(&body) {
                // Card failures are a user-facing decline, not a system fault
                if failure.error.error_type == "card_error" {
                    debug!(code = ?failure.error.code, "card declined");
                    return Ok(ConfirmOutcome::Declined {
                        message: failure.error.message,
                    });
                }
                error!(
                    error_type = %failure.error.error_type,
                    "processor rejected confirmation"
                );
                return Err(CheckoutError::ProviderError {
                    provider: "processor".to_string(),
                    message: failure.error.message,
                });
            }
            return Err(CheckoutError::ProviderError {
                provider: "processor".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let intent: ConfirmedIntent = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse processor response: {}", e))
        })?;

        match intent.status.as_str() {
            // The charge is in flight or captured; settlement is the webhook's
            // problem from here
            "succeeded" | "processing" | "requires_capture" => {
                debug!(status = %intent.status, "intent confirmed");
                Ok(ConfirmOutcome::Confirmed {
                    payment_intent_id: intent.id,
                })
            }
            "requires_payment_method" => Ok(ConfirmOutcome::Declined {
                message: "Your payment method was not accepted. Please try another card."
                    .to_string(),
            }),
            other => Err(CheckoutError::ProviderError {
                provider: "processor".to_string(),
                message: format!("Unexpected intent status: {}", other),
            }),
        }
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ConfirmedIntent {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ProcessorErrorResponse {
    error: ProcessorErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProcessorErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
    #[serde(default)]
    code: Option<String>,
}
