//! # Booking Types
//!
//! Booking shapes exchanged with the booking backend: creation payloads,
//! persisted booking/group responses, and the tagged `BookingInfo` union the
//! rest of the checkout flow pattern-matches on.

use crate::error::{CheckoutError, CheckoutResult};
use crate::quote::{
    CustomerContact, CustomerIdentity, Location, QuoteSnapshot, ServiceType, VehicleType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Backend booking status
///
/// A booking is paid iff its status equals the `Paid` marker; every other
/// value is "not paid yet" from the checkout flow's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    PendingPayment,
    Paid,
    Confirmed,
    Completed,
    Cancelled,
}

/// A persisted journey leg owned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Human-readable reference shown to the customer (e.g. TRF-4G7K2M)
    pub booking_reference: String,
    pub status: BookingStatus,
}

impl Booking {
    pub fn is_paid(&self) -> bool {
        self.status == BookingStatus::Paid
    }
}

/// A linked outbound/return pair sharing one price and one payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingGroup {
    pub id: Uuid,
    pub group_reference: String,
    pub bookings: Vec<Booking>,
}

impl BookingGroup {
    /// A group is paid iff every member booking reports paid
    pub fn is_paid(&self) -> bool {
        !self.bookings.is_empty() && self.bookings.iter().all(Booking::is_paid)
    }
}

/// The result of a successful creation call, discriminated by journey shape.
///
/// At most one of these exists per checkout session; once recorded, the
/// booking creator is never invoked again for that session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingInfo {
    Single {
        booking_id: Uuid,
        booking_reference: String,
    },
    Group {
        booking_group_id: Uuid,
        group_reference: String,
    },
}

impl BookingInfo {
    /// The reference shown to the customer, regardless of shape
    pub fn reference(&self) -> &str {
        match self {
            BookingInfo::Single {
                booking_reference, ..
            } => booking_reference,
            BookingInfo::Group {
                group_reference, ..
            } => group_reference,
        }
    }
}

/// Processor client secret + processor-side payment identifier.
///
/// Scoped to exactly one `BookingInfo`; created at most once per booking
/// unless the prior creation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHandle {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// One numbered status fetch during a polling run.
///
/// Transient: exists only for the duration of the run and is reported to the
/// caller for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollAttempt {
    /// 1-based attempt number
    pub number: u32,
    pub at: DateTime<Utc>,
    pub paid: bool,
}

/// One journey leg as sent to the booking backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingLeg {
    pub service_type: ServiceType,
    pub pickup: Location,
    pub dropoff: Location,
    #[serde(default)]
    pub stops: Vec<Location>,
    pub pickup_at: DateTime<Utc>,
    pub passengers: u32,
    pub luggage: u32,
    pub vehicle: VehicleType,
    #[serde(default)]
    pub child_seats: u32,
    #[serde(default)]
    pub booster_seats: u32,
    #[serde(default)]
    pub meet_and_greet: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
}

impl BookingLeg {
    /// Build the outbound leg straight from the quote
    fn outbound(quote: &QuoteSnapshot) -> Self {
        Self {
            service_type: quote.service_type,
            pickup: quote.pickup.clone(),
            dropoff: quote.dropoff.clone(),
            stops: quote.stops.clone(),
            pickup_at: quote.pickup_at,
            passengers: quote.passengers,
            luggage: quote.luggage,
            vehicle: quote.vehicle,
            child_seats: quote.add_ons.child_seats,
            booster_seats: quote.add_ons.booster_seats,
            meet_and_greet: quote.add_ons.meet_and_greet,
            flight_number: quote.flight_number.clone(),
            special_requirements: quote.special_requirements(),
        }
    }

    /// Derive the return leg from the outbound quote.
    ///
    /// Service type is the structural inverse, pickup/dropoff swap, stops are
    /// not mirrored, and meet & greet / flight number are outbound-only
    /// concepts so they are dropped.
    fn return_of(quote: &QuoteSnapshot, return_at: DateTime<Utc>) -> Self {
        Self {
            service_type: quote.service_type.return_inverse(),
            pickup: quote.dropoff.clone(),
            dropoff: quote.pickup.clone(),
            stops: Vec::new(),
            pickup_at: return_at,
            passengers: quote.passengers,
            luggage: quote.luggage,
            vehicle: quote.vehicle,
            child_seats: quote.add_ons.child_seats,
            booster_seats: quote.add_ons.booster_seats,
            meet_and_greet: false,
            flight_number: None,
            special_requirements: quote.special_requirements(),
        }
    }
}

/// Payload for a single-journey creation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingPayload {
    pub customer_id: String,
    pub contact: CustomerContact,
    pub leg: BookingLeg,
    /// Amount charged for this booking, in pence
    pub amount_pence: i64,
}

impl BookingPayload {
    pub fn from_quote(quote: &QuoteSnapshot, customer: &CustomerIdentity) -> Self {
        Self {
            customer_id: customer.customer_id.clone(),
            contact: quote.contact.clone(),
            leg: BookingLeg::outbound(quote),
            amount_pence: quote.price.total_pence,
        }
    }
}

/// Payload for the atomic linked-pair creation call.
///
/// Carries two full leg descriptions plus the combined discounted total; the
/// backend creates both legs as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnBookingPayload {
    pub customer_id: String,
    pub contact: CustomerContact,
    pub outbound: BookingLeg,
    #[serde(rename = "return")]
    pub return_leg: BookingLeg,
    /// Combined total after discount, in pence
    pub total_pence: i64,
    pub discount_pence: i64,
}

impl ReturnBookingPayload {
    pub fn from_quote(
        quote: &QuoteSnapshot,
        customer: &CustomerIdentity,
    ) -> CheckoutResult<Self> {
        let return_at = quote.return_at.ok_or_else(|| {
            CheckoutError::InvalidQuote("return journey has no return time".to_string())
        })?;
        Ok(Self {
            customer_id: customer.customer_id.clone(),
            contact: quote.contact.clone(),
            outbound: BookingLeg::outbound(quote),
            return_leg: BookingLeg::return_of(quote, return_at),
            total_pence: quote.price.total_pence,
            discount_pence: quote.price.discount_pence,
        })
    }
}
