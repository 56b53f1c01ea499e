//! # Application State
//!
//! Shared state for the sandbox backend. Bookings and booking groups live in
//! in-memory maps; the simulated settlement webhook flips bookings to paid a
//! configurable delay after intent creation.

use checkout_core::{Booking, BookingGroup, BookingStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Delay before the simulated webhook marks bookings paid
    pub webhook_delay: Duration,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            webhook_delay: Duration::from_millis(
                std::env::var("WEBHOOK_DELAY_MS")
                    .ok()
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(4000),
            ),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// A stored group: reference plus member booking ids. Member status lives in
/// the bookings map so the webhook only has one place to flip.
#[derive(Debug, Clone)]
struct StoredGroup {
    group_reference: String,
    member_ids: Vec<Uuid>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    bookings: Arc<Mutex<HashMap<Uuid, Booking>>>,
    groups: Arc<Mutex<HashMap<Uuid, StoredGroup>>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            bookings: Arc::new(Mutex::new(HashMap::new())),
            groups: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Persist a new pending booking and return it
    pub fn insert_booking(&self, reference: String) -> Booking {
        let booking = Booking {
            id: Uuid::new_v4(),
            booking_reference: reference,
            status: BookingStatus::PendingPayment,
        };
        self.bookings
            .lock()
            .unwrap()
            .insert(booking.id, booking.clone());
        booking
    }

    /// Persist a linked pair as one unit and return the assembled group
    pub fn insert_group(
        &self,
        group_reference: String,
        legs: Vec<Booking>,
    ) -> BookingGroup {
        let group_id = Uuid::new_v4();
        {
            let mut bookings = self.bookings.lock().unwrap();
            for leg in &legs {
                bookings.insert(leg.id, leg.clone());
            }
        }
        self.groups.lock().unwrap().insert(
            group_id,
            StoredGroup {
                group_reference: group_reference.clone(),
                member_ids: legs.iter().map(|b| b.id).collect(),
            },
        );
        BookingGroup {
            id: group_id,
            group_reference,
            bookings: legs,
        }
    }

    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.bookings.lock().unwrap().get(&id).cloned()
    }

    /// Reassemble a group from the current booking states
    pub fn booking_group(&self, id: Uuid) -> Option<BookingGroup> {
        let groups = self.groups.lock().unwrap();
        let stored = groups.get(&id)?;
        let bookings = self.bookings.lock().unwrap();
        let members = stored
            .member_ids
            .iter()
            .filter_map(|member| bookings.get(member).cloned())
            .collect();
        Some(BookingGroup {
            id,
            group_reference: stored.group_reference.clone(),
            bookings: members,
        })
    }

    /// Member booking ids for a group, if it exists
    pub fn group_member_ids(&self, id: Uuid) -> Option<Vec<Uuid>> {
        self.groups
            .lock()
            .unwrap()
            .get(&id)
            .map(|stored| stored.member_ids.clone())
    }

    /// What the settlement webhook would do: mark the bookings paid
    pub fn mark_paid(&self, ids: &[Uuid]) {
        let mut bookings = self.bookings.lock().unwrap();
        for id in ids {
            if let Some(booking) = bookings.get_mut(id) {
                booking.status = BookingStatus::Paid;
            }
        }
    }
}
