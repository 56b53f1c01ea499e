//! # Quote Snapshot Types
//!
//! The frozen, already-priced description of a journey captured before
//! checkout begins. A snapshot is immutable once captured: the checkout flow
//! consumes it exactly once and clears it on terminal success.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single one-way trip or a linked outbound/return pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyType {
    Single,
    Return,
}

/// Service shape of a transfer leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Pickup at an airport arrivals hall
    AirportPickup,
    /// Dropoff at an airport terminal
    AirportDropoff,
    /// Neither end is an airport
    PointToPoint,
}

impl ServiceType {
    /// Structural inverse used when deriving the return leg of a pair.
    ///
    /// An airport-pickup outbound implies an airport-dropoff return and vice
    /// versa; point-to-point maps to itself.
    pub fn return_inverse(self) -> Self {
        match self {
            ServiceType::AirportPickup => ServiceType::AirportDropoff,
            ServiceType::AirportDropoff => ServiceType::AirportPickup,
            ServiceType::PointToPoint => ServiceType::PointToPoint,
        }
    }
}

/// A geocoded address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub postcode: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Vehicle class requested for the journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Saloon,
    Estate,
    Mpv,
    ExecutiveSaloon,
    Minibus,
}

/// Optional extras selected with the quote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOns {
    #[serde(default)]
    pub child_seats: u32,
    #[serde(default)]
    pub booster_seats: u32,
    #[serde(default)]
    pub meet_and_greet: bool,
    #[serde(default)]
    pub wheelchair_access: bool,
    #[serde(default)]
    pub pets: bool,
}

/// Customer contact details entered with the quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// An authenticated customer account, supplied by the session service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Previously computed price, in minor currency units (pence)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Outbound leg price
    pub outbound_pence: i64,
    /// Return leg price, if a return journey was quoted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_pence: Option<i64>,
    /// Discount applied to the combined price
    #[serde(default)]
    pub discount_pence: i64,
    /// Combined total after discount — the amount actually charged
    pub total_pence: i64,
}

/// The priced quote plus journey details, captured by the quote flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub journey: JourneyType,
    pub service_type: ServiceType,
    pub pickup: Location,
    pub dropoff: Location,
    /// Intermediate stops on the outbound leg (never mirrored on the return)
    #[serde(default)]
    pub stops: Vec<Location>,
    pub pickup_at: DateTime<Utc>,
    /// Required when `journey` is `Return`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_at: Option<DateTime<Utc>>,
    pub passengers: u32,
    pub luggage: u32,
    pub vehicle: VehicleType,
    #[serde(default)]
    pub add_ons: AddOns,
    /// Outbound-only: tracked for airport pickups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    /// Free-text notes from the customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub contact: CustomerContact,
    pub price: PriceBreakdown,
}

impl QuoteSnapshot {
    pub fn is_return(&self) -> bool {
        self.journey == JourneyType::Return
    }

    /// Assemble the special-requirements string sent with a booking.
    ///
    /// Only requirements actually requested contribute a clause, in a fixed
    /// order (wheelchair access, pet travel, free-text notes), joined by
    /// "; ". Seat counts travel as structured fields, not in this string.
    pub fn special_requirements(&self) -> Option<String> {
        let mut clauses: Vec<&str> = Vec::new();
        if self.add_ons.wheelchair_access {
            clauses.push("Wheelchair access required");
        }
        if self.add_ons.pets {
            clauses.push("Travelling with pets");
        }
        if let Some(notes) = self.notes.as_deref() {
            let notes = notes.trim();
            if !notes.is_empty() {
                clauses.push(notes);
            }
        }
        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join("; "))
        }
    }
}
