//! # Booking Backend REST Client
//!
//! reqwest-backed implementation of the `BookingApi` and `PaymentGateway`
//! seams against the booking backend's JSON API.

use crate::config::BackendConfig;
use async_trait::async_trait;
use checkout_core::{
    Booking, BookingApi, BookingGroup, BookingPayload, CheckoutError, CheckoutResult,
    PaymentGateway, PaymentHandle, ReturnBookingPayload,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Client for the booking backend REST API
pub struct RestBookingClient {
    config: BackendConfig,
    client: Client,
}

impl RestBookingClient {
    /// Create a new client over the given backend config
    pub fn new(config: BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        let config = BackendConfig::from_env()?;
        Ok(Self::new(config))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", self.config.auth_header())
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", self.config.auth_header())
            .json(body)
    }

    /// Send a request and decode the JSON response, mapping error shapes the
    /// way the backend reports them
    async fn execute<R: DeserializeOwned>(&self, request: RequestBuilder) -> CheckoutResult<R> {
        let response = request
            .send()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("booking API error: status={}, body={}", status, body);

            if let Ok(api_error) = serde_json::from_str::<ApiErrorBody>(&body) {
                return Err(CheckoutError::ProviderError {
                    provider: "booking-api".to_string(),
                    message: api_error.error,
                });
            }
            if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::GATEWAY_TIMEOUT {
                return Err(CheckoutError::NetworkError(format!("HTTP {}", status)));
            }
            return Err(CheckoutError::ProviderError {
                provider: "booking-api".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse backend response: {}", e))
        })
    }
}

#[async_trait]
impl BookingApi for RestBookingClient {
    #[instrument(skip_all, fields(service = ?payload.leg.service_type))]
    async fn create_booking(&self, payload: &BookingPayload) -> CheckoutResult<Booking> {
        debug!("creating single booking");
        let booking: Booking = self
            .execute(self.post("/api/v1/bookings", payload))
            .await?;
        debug!(reference = %booking.booking_reference, "booking created");
        Ok(booking)
    }

    #[instrument(skip_all)]
    async fn create_return_booking(
        &self,
        payload: &ReturnBookingPayload,
    ) -> CheckoutResult<BookingGroup> {
        debug!("creating linked return pair");
        let group: BookingGroup = self
            .execute(self.post("/api/v1/bookings/return", payload))
            .await?;
        debug!(reference = %group.group_reference, legs = group.bookings.len(), "group created");
        Ok(group)
    }

    async fn booking(&self, id: Uuid) -> CheckoutResult<Booking> {
        self.execute(self.get(&format!("/api/v1/bookings/{}", id)))
            .await
    }

    async fn booking_group(&self, id: Uuid) -> CheckoutResult<BookingGroup> {
        self.execute(self.get(&format!("/api/v1/booking-groups/{}", id)))
            .await
    }
}

#[async_trait]
impl PaymentGateway for RestBookingClient {
    #[instrument(skip(self))]
    async fn create_payment_intent(
        &self,
        booking_id: Uuid,
        amount_pence: i64,
    ) -> CheckoutResult<PaymentHandle> {
        let request = CreateIntentRequest {
            booking_id: Some(booking_id),
            booking_group_id: None,
            amount_pence,
        };
        self.execute(self.post("/api/v1/payments/intents", &request))
            .await
            .map_err(payment_context)
    }

    #[instrument(skip(self))]
    async fn create_group_payment_intent(
        &self,
        booking_group_id: Uuid,
        amount_pence: i64,
    ) -> CheckoutResult<PaymentHandle> {
        let request = CreateIntentRequest {
            booking_id: None,
            booking_group_id: Some(booking_group_id),
            amount_pence,
        };
        self.execute(self.post("/api/v1/payments/group-intents", &request))
            .await
            .map_err(payment_context)
    }
}

/// Intent-creation failures surface to the user with payment context
fn payment_context(err: CheckoutError) -> CheckoutError {
    match err {
        CheckoutError::ProviderError { message, .. } => CheckoutError::PaymentInit(message),
        other => other,
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateIntentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    booking_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    booking_group_id: Option<Uuid>,
    amount_pence: i64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::{
        AddOns, BookingStatus, CustomerContact, CustomerIdentity, JourneyType, Location,
        PriceBreakdown, QuoteSnapshot, ServiceType, VehicleType,
    };
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RestBookingClient {
        RestBookingClient::new(BackendConfig::new(server.uri(), "tok_test"))
    }

    fn quote() -> QuoteSnapshot {
        QuoteSnapshot {
            journey: JourneyType::Single,
            service_type: ServiceType::AirportDropoff,
            pickup: Location {
                address: "12 Castle Street, Guildford".into(),
                postcode: "GU1 3UW".into(),
                latitude: 51.235,
                longitude: -0.574,
            },
            dropoff: Location {
                address: "Gatwick South Terminal".into(),
                postcode: "RH6 0NP".into(),
                latitude: 51.156,
                longitude: -0.161,
            },
            stops: vec![],
            pickup_at: Utc.with_ymd_and_hms(2026, 10, 2, 5, 15, 0).unwrap(),
            return_at: None,
            passengers: 1,
            luggage: 1,
            vehicle: VehicleType::Saloon,
            add_ons: AddOns::default(),
            flight_number: None,
            notes: None,
            contact: CustomerContact {
                name: "Ada Fletcher".into(),
                email: "ada@example.com".into(),
                phone: "+447700900123".into(),
            },
            price: PriceBreakdown {
                outbound_pence: 6200,
                return_pence: None,
                discount_pence: 0,
                total_pence: 6200,
            },
        }
    }

    fn customer() -> CustomerIdentity {
        CustomerIdentity {
            customer_id: "cus_81f4".into(),
            name: "Ada Fletcher".into(),
            email: "ada@example.com".into(),
            phone: "+447700900123".into(),
        }
    }

    #[tokio::test]
    async fn test_create_booking_posts_payload_with_auth() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path("/api/v1/bookings"))
            .and(header("Authorization", "Bearer tok_test"))
            .and(body_partial_json(serde_json::json!({
                "customer_id": "cus_81f4",
                "amount_pence": 6200
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": id,
                "booking_reference": "TRF-4G7K2M",
                "status": "PENDING_PAYMENT"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let payload = BookingPayload::from_quote(&quote(), &customer());
        let booking = client_for(&server).create_booking(&payload).await.unwrap();

        assert_eq!(booking.id, id);
        assert_eq!(booking.booking_reference, "TRF-4G7K2M");
        assert_eq!(booking.status, BookingStatus::PendingPayment);
    }

    #[tokio::test]
    async fn test_backend_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/bookings"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "error": "pickup time is in the past"
            })))
            .mount(&server)
            .await;

        let payload = BookingPayload::from_quote(&quote(), &customer());
        let err = client_for(&server)
            .create_booking(&payload)
            .await
            .unwrap_err();

        match err {
            CheckoutError::ProviderError { provider, message } => {
                assert_eq!(provider, "booking-api");
                assert_eq!(message, "pickup time is in the past");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_network_error() {
        // Nothing listens on this port
        let client = RestBookingClient::new(BackendConfig::new("http://127.0.0.1:9", "tok_test"));
        let err = client.booking(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_booking_status_fetch() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/bookings/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": id,
                "booking_reference": "TRF-4G7K2M",
                "status": "PAID"
            })))
            .mount(&server)
            .await;

        let booking = client_for(&server).booking(id).await.unwrap();
        assert!(booking.is_paid());
    }

    #[tokio::test]
    async fn test_group_status_fetch_includes_all_legs() {
        let server = MockServer::start().await;
        let group_id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/booking-groups/{}", group_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": group_id,
                "group_reference": "GRP-9XT44P",
                "bookings": [
                    { "id": Uuid::new_v4(), "booking_reference": "TRF-AAA111", "status": "PAID" },
                    { "id": Uuid::new_v4(), "booking_reference": "TRF-BBB222", "status": "PENDING_PAYMENT" }
                ]
            })))
            .mount(&server)
            .await;

        let group = client_for(&server).booking_group(group_id).await.unwrap();
        assert_eq!(group.bookings.len(), 2);
        assert!(!group.is_paid());
    }

    #[tokio::test]
    async fn test_group_intent_routes_to_group_endpoint() {
        let server = MockServer::start().await;
        let group_id = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path("/api/v1/payments/group-intents"))
            .and(body_partial_json(serde_json::json!({
                "booking_group_id": group_id,
                "amount_pence": 15300
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "client_secret": "pi_3abc_secret_xyz",
                "payment_intent_id": "pi_3abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handle = client_for(&server)
            .create_group_payment_intent(group_id, 15300)
            .await
            .unwrap();
        assert_eq!(handle.payment_intent_id, "pi_3abc");
    }

    #[tokio::test]
    async fn test_intent_failure_carries_payment_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments/intents"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "processor unavailable"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_payment_intent(Uuid::new_v4(), 6200)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentInit(_)));
    }
}
