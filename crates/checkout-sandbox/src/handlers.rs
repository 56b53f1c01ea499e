//! # Request Handlers
//!
//! Axum request handlers for the sandbox booking backend. Payment intents
//! are stubbed: creating one schedules a delayed task that marks the covered
//! bookings paid, standing in for the processor's settlement webhook.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use checkout_core::{Booking, BookingPayload, PaymentHandle, ReturnBookingPayload};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create payment intent request
#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    #[serde(default)]
    pub booking_id: Option<Uuid>,
    #[serde(default)]
    pub booking_group_id: Option<Uuid>,
    pub amount_pence: i64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn not_found(what: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("{} not found", what), 404)),
    )
}

/// Customer-facing reference: prefix plus six characters from a fresh UUID
fn new_reference(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, id[..6].to_uppercase())
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "checkout-sandbox",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a single booking
#[instrument(skip_all, fields(customer = %payload.customer_id))]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<BookingPayload>,
) -> Result<(StatusCode, Json<Booking>), (StatusCode, Json<ErrorResponse>)> {
    if payload.amount_pence <= 0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new("amount_pence must be positive", 422)),
        ));
    }

    let booking = state.insert_booking(new_reference("TRF"));
    info!(reference = %booking.booking_reference, "booking created");
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Create a linked outbound/return pair as one unit
#[instrument(skip_all, fields(customer = %payload.customer_id))]
pub async fn create_return_booking(
    State(state): State<AppState>,
    Json(payload): Json<ReturnBookingPayload>,
) -> Result<(StatusCode, Json<checkout_core::BookingGroup>), (StatusCode, Json<ErrorResponse>)> {
    if payload.return_leg.pickup_at <= payload.outbound.pickup_at {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(
                "return pickup must be after the outbound pickup",
                422,
            )),
        ));
    }

    let legs = vec![
        Booking {
            id: Uuid::new_v4(),
            booking_reference: new_reference("TRF"),
            status: checkout_core::BookingStatus::PendingPayment,
        },
        Booking {
            id: Uuid::new_v4(),
            booking_reference: new_reference("TRF"),
            status: checkout_core::BookingStatus::PendingPayment,
        },
    ];
    let group = state.insert_group(new_reference("GRP"), legs);
    info!(reference = %group.group_reference, "booking group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// Fetch one booking
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, (StatusCode, Json<ErrorResponse>)> {
    state.booking(id).map(Json).ok_or_else(|| not_found("booking"))
}

/// Fetch one booking group with all member legs
pub async fn get_booking_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<checkout_core::BookingGroup>, (StatusCode, Json<ErrorResponse>)> {
    state
        .booking_group(id)
        .map(Json)
        .ok_or_else(|| not_found("booking group"))
}

/// Create a payment intent for a single booking and schedule the simulated
/// settlement webhook
#[instrument(skip(state))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<PaymentHandle>, (StatusCode, Json<ErrorResponse>)> {
    let booking_id = request.booking_id.ok_or_else(|| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new("booking_id is required", 422)),
        )
    })?;
    if state.booking(booking_id).is_none() {
        return Err(not_found("booking"));
    }

    schedule_webhook(&state, vec![booking_id]);
    Ok(Json(stub_handle(request.amount_pence)))
}

/// Create a payment intent covering every leg of a group
#[instrument(skip(state))]
pub async fn create_group_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<PaymentHandle>, (StatusCode, Json<ErrorResponse>)> {
    let group_id = request.booking_group_id.ok_or_else(|| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new("booking_group_id is required", 422)),
        )
    })?;
    let member_ids = state
        .group_member_ids(group_id)
        .ok_or_else(|| not_found("booking group"))?;

    schedule_webhook(&state, member_ids);
    Ok(Json(stub_handle(request.amount_pence)))
}

fn stub_handle(amount_pence: i64) -> PaymentHandle {
    let id = format!("pi_sbx_{}", Uuid::new_v4().simple());
    if amount_pence <= 0 {
        warn!(amount_pence, "intent created for a non-positive amount");
    }
    PaymentHandle {
        client_secret: format!("{}_secret_{}", id, Uuid::new_v4().simple()),
        payment_intent_id: id,
    }
}

/// The real webhook arrives from the processor after settlement; the sandbox
/// approximates it with a delayed task
fn schedule_webhook(state: &AppState, ids: Vec<Uuid>) {
    let state = state.clone();
    let delay = state.config.webhook_delay;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        state.mark_paid(&ids);
        info!(bookings = ids.len(), "simulated webhook marked bookings paid");
    });
}
