//! Test doubles and fixtures shared by the engine's unit tests.

use async_trait::async_trait;
use checkout_core::{
    AddOns, Booking, BookingApi, BookingGroup, BookingPayload, BookingStatus, CheckoutError,
    CheckoutResult, ConfirmOutcome, CustomerContact, CustomerIdentity, IdentityProvider,
    JourneyType, Location, PaymentConfirmer, PaymentGateway, PaymentHandle, PriceBreakdown,
    QuoteSnapshot, ReturnBookingPayload, ServiceType, VehicleType,
};
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;
use uuid::Uuid;

pub(crate) fn location(address: &str) -> Location {
    Location {
        address: address.to_string(),
        postcode: "GU1 1AA".to_string(),
        latitude: 51.23,
        longitude: -0.57,
    }
}

pub(crate) fn sample_quote(journey: JourneyType) -> QuoteSnapshot {
    QuoteSnapshot {
        journey,
        service_type: ServiceType::AirportPickup,
        pickup: location("Heathrow Terminal 5"),
        dropoff: location("12 Castle Street, Guildford"),
        stops: vec![],
        pickup_at: Utc.with_ymd_and_hms(2026, 9, 14, 10, 30, 0).unwrap(),
        return_at: match journey {
            JourneyType::Single => None,
            JourneyType::Return => Some(Utc.with_ymd_and_hms(2026, 9, 21, 6, 0, 0).unwrap()),
        },
        passengers: 2,
        luggage: 3,
        vehicle: VehicleType::ExecutiveSaloon,
        add_ons: AddOns::default(),
        flight_number: Some("BA117".to_string()),
        notes: None,
        contact: CustomerContact {
            name: "Ada Fletcher".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+447700900123".to_string(),
        },
        price: PriceBreakdown {
            outbound_pence: 8500,
            return_pence: match journey {
                JourneyType::Single => None,
                JourneyType::Return => Some(8500),
            },
            discount_pence: match journey {
                JourneyType::Single => 0,
                JourneyType::Return => 1700,
            },
            total_pence: match journey {
                JourneyType::Single => 8500,
                JourneyType::Return => 15300,
            },
        },
    }
}

pub(crate) fn customer() -> CustomerIdentity {
    CustomerIdentity {
        customer_id: "cus_81f4".to_string(),
        name: "Ada Fletcher".to_string(),
        email: "ada@example.com".to_string(),
        phone: "+447700900123".to_string(),
    }
}

pub(crate) struct StaticIdentity(pub(crate) Option<CustomerIdentity>);

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> Option<CustomerIdentity> {
        self.0.clone()
    }
}

/// Scriptable booking backend double.
///
/// Counts creation calls, can fail the first N of them, can block a creation
/// call until released (for in-flight guard tests), and reports bookings as
/// paid once a configured number of status fetches has happened.
pub(crate) struct MockBackend {
    create_calls: AtomicU32,
    remaining_failures: AtomicU32,
    status_calls: AtomicU32,
    /// Status fetches report paid from this fetch number on (0 = immediately)
    paid_after: AtomicU32,
    fail_status: AtomicBool,
    block_creates: AtomicBool,
    blocked_now: AtomicBool,
    release: Notify,
    created: Mutex<Vec<Uuid>>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self {
            create_calls: AtomicU32::new(0),
            remaining_failures: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            paid_after: AtomicU32::new(0),
            fail_status: AtomicBool::new(false),
            block_creates: AtomicBool::new(false),
            blocked_now: AtomicBool::new(false),
            release: Notify::new(),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next `n` creation calls with a network error
    pub(crate) fn failing(self, n: u32) -> Self {
        self.remaining_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Block creation calls until `release` is called
    pub(crate) fn blocking(self) -> Self {
        self.block_creates.store(true, Ordering::SeqCst);
        self
    }

    /// Report paid only from the `n`-th status fetch onward
    pub(crate) fn paid_from_fetch(self, n: u32) -> Self {
        self.paid_after.store(n, Ordering::SeqCst);
        self
    }

    /// Make every status fetch fail with a network error
    pub(crate) fn with_status_failure(self) -> Self {
        self.fail_status.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn release(&self) {
        self.release.notify_one();
    }

    pub(crate) async fn wait_until_blocked(&self) {
        while !self.blocked_now.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }

    async fn enter_create(&self) -> CheckoutResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.block_creates.load(Ordering::SeqCst) {
            self.blocked_now.store(true, Ordering::SeqCst);
            self.release.notified().await;
            self.blocked_now.store(false, Ordering::SeqCst);
        }
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(CheckoutError::NetworkError(
                "simulated backend failure".to_string(),
            ));
        }
        Ok(())
    }

    fn status_for_fetch(&self, fetch_number: u32) -> BookingStatus {
        if fetch_number >= self.paid_after.load(Ordering::SeqCst) {
            BookingStatus::Paid
        } else {
            BookingStatus::PendingPayment
        }
    }

    fn check_status_fetch(&self) -> CheckoutResult<u32> {
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(CheckoutError::NetworkError(
                "simulated status outage".to_string(),
            ));
        }
        Ok(self.status_calls.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl BookingApi for MockBackend {
    async fn create_booking(&self, _payload: &BookingPayload) -> CheckoutResult<Booking> {
        self.enter_create().await?;
        let id = Uuid::new_v4();
        self.created.lock().expect("created lock").push(id);
        Ok(Booking {
            id,
            booking_reference: "TRF-4G7K2M".to_string(),
            status: BookingStatus::PendingPayment,
        })
    }

    async fn create_return_booking(
        &self,
        _payload: &ReturnBookingPayload,
    ) -> CheckoutResult<BookingGroup> {
        self.enter_create().await?;
        let outbound = Uuid::new_v4();
        let inbound = Uuid::new_v4();
        {
            let mut created = self.created.lock().expect("created lock");
            created.push(outbound);
            created.push(inbound);
        }
        Ok(BookingGroup {
            id: Uuid::new_v4(),
            group_reference: "GRP-9XT44P".to_string(),
            bookings: vec![
                Booking {
                    id: outbound,
                    booking_reference: "TRF-4G7K2M".to_string(),
                    status: BookingStatus::PendingPayment,
                },
                Booking {
                    id: inbound,
                    booking_reference: "TRF-4G7K2N".to_string(),
                    status: BookingStatus::PendingPayment,
                },
            ],
        })
    }

    async fn booking(&self, id: Uuid) -> CheckoutResult<Booking> {
        let fetch = self.check_status_fetch()?;
        Ok(Booking {
            id,
            booking_reference: "TRF-4G7K2M".to_string(),
            status: self.status_for_fetch(fetch),
        })
    }

    async fn booking_group(&self, id: Uuid) -> CheckoutResult<BookingGroup> {
        let fetch = self.check_status_fetch()?;
        let status = self.status_for_fetch(fetch);
        Ok(BookingGroup {
            id,
            group_reference: "GRP-9XT44P".to_string(),
            bookings: vec![
                Booking {
                    id: Uuid::new_v4(),
                    booking_reference: "TRF-4G7K2M".to_string(),
                    status,
                },
                Booking {
                    id: Uuid::new_v4(),
                    booking_reference: "TRF-4G7K2N".to_string(),
                    status,
                },
            ],
        })
    }
}

/// Payment gateway double counting intent creations
pub(crate) struct MockGateway {
    intent_calls: AtomicU32,
    fail_next: AtomicBool,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self {
            intent_calls: AtomicU32::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    pub(crate) fn failing_once(self) -> Self {
        self.fail_next.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn intent_calls(&self) -> u32 {
        self.intent_calls.load(Ordering::SeqCst)
    }

    fn next_handle(&self, scope: &str) -> CheckoutResult<PaymentHandle> {
        self.intent_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(CheckoutError::PaymentInit(
                "simulated gateway failure".to_string(),
            ));
        }
        let id = Uuid::new_v4().simple().to_string();
        Ok(PaymentHandle {
            client_secret: format!("pi_{scope}_{id}_secret"),
            payment_intent_id: format!("pi_{scope}_{id}"),
        })
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_payment_intent(
        &self,
        _booking_id: Uuid,
        _amount_pence: i64,
    ) -> CheckoutResult<PaymentHandle> {
        self.next_handle("single")
    }

    async fn create_group_payment_intent(
        &self,
        _booking_group_id: Uuid,
        _amount_pence: i64,
    ) -> CheckoutResult<PaymentHandle> {
        self.next_handle("group")
    }
}

/// Confirmer double with a fixed outcome
pub(crate) enum MockConfirmer {
    Accepting,
    Declining(&'static str),
}

#[async_trait]
impl PaymentConfirmer for MockConfirmer {
    async fn confirm(&self, handle: &PaymentHandle) -> CheckoutResult<ConfirmOutcome> {
        match self {
            MockConfirmer::Accepting => Ok(ConfirmOutcome::Confirmed {
                payment_intent_id: handle.payment_intent_id.clone(),
            }),
            MockConfirmer::Declining(reason) => Ok(ConfirmOutcome::Declined {
                message: (*reason).to_string(),
            }),
        }
    }
}
