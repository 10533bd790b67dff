//! In-memory repository and gateway fakes for service-level tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use daytrip_core::attraction::{Attraction, AttractionCard};
use daytrip_core::booking::{ActiveBooking, NewBooking};
use daytrip_core::order::{NewOrder, OrderDetail, OrderStatus, Trip};
use daytrip_core::payment::{ChargeOutcome, ChargeRequest, PaymentGateway};
use daytrip_core::repository::{
    AttractionRepository, BookingRepository, OrderRepository, StoreError,
};

#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub order: NewOrder,
    pub booking: ActiveBooking,
    pub paid: bool,
    pub raw: Option<Value>,
}

#[derive(Default)]
pub struct MemoryStore {
    attraction_ids: Vec<i64>,
    next_booking_id: AtomicI64,
    active: Mutex<HashMap<i64, ActiveBooking>>,
    orders: Mutex<HashMap<String, StoredOrder>>,
    replace_errors: Mutex<Vec<StoreError>>,
    create_errors: Mutex<Vec<StoreError>>,
    record_payment_fails: AtomicBool,
}

impl MemoryStore {
    pub fn with_attractions(ids: &[i64]) -> Arc<Self> {
        Arc::new(Self {
            attraction_ids: ids.to_vec(),
            next_booking_id: AtomicI64::new(1),
            ..Default::default()
        })
    }

    pub fn active_count(&self, member_id: i64) -> usize {
        usize::from(self.active.lock().unwrap().contains_key(&member_id))
    }

    pub fn order(&self, number: &str) -> Option<StoredOrder> {
        self.orders.lock().unwrap().get(number).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    /// Errors returned (in order) by the next `replace_active` calls, e.g. a
    /// unique-index violation from losing a concurrent create.
    pub fn queue_replace_error(&self, err: StoreError) {
        self.replace_errors.lock().unwrap().push(err);
    }

    /// Errors returned (in order) by the next `create_unpaid` calls.
    pub fn queue_create_error(&self, err: StoreError) {
        self.create_errors.lock().unwrap().push(err);
    }

    pub fn fail_record_payment(&self) {
        self.record_payment_fails.store(true, Ordering::SeqCst);
    }

    fn card(id: i64) -> AttractionCard {
        AttractionCard {
            id,
            name: format!("Attraction {id}"),
            address: "100 Harbor Road".to_string(),
            image: "https://img.example/0.jpg".to_string(),
        }
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn active_for_member(
        &self,
        member_id: i64,
    ) -> Result<Option<ActiveBooking>, StoreError> {
        Ok(self.active.lock().unwrap().get(&member_id).cloned())
    }

    async fn replace_active(
        &self,
        member_id: i64,
        booking: &NewBooking,
    ) -> Result<(), StoreError> {
        {
            let mut errors = self.replace_errors.lock().unwrap();
            if !errors.is_empty() {
                return Err(errors.remove(0));
            }
        }

        let id = self.next_booking_id.fetch_add(1, Ordering::SeqCst);
        self.active.lock().unwrap().insert(
            member_id,
            ActiveBooking {
                id,
                attraction: Self::card(booking.attraction_id),
                date: booking.date,
                time: booking.time,
                price: booking.price,
            },
        );
        Ok(())
    }

    async fn supersede_active(&self, member_id: i64) -> Result<(), StoreError> {
        self.active.lock().unwrap().remove(&member_id);
        Ok(())
    }
}

#[async_trait]
impl AttractionRepository for MemoryStore {
    async fn list(
        &self,
        _page: u32,
        _category: Option<&str>,
        _keyword: Option<&str>,
    ) -> Result<Vec<Attraction>, StoreError> {
        Ok(Vec::new())
    }

    async fn get(&self, _id: i64) -> Result<Option<Attraction>, StoreError> {
        Ok(None)
    }

    async fn exists(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.attraction_ids.contains(&id))
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    async fn mrts(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_unpaid(&self, order: &NewOrder) -> Result<(), StoreError> {
        {
            let mut errors = self.create_errors.lock().unwrap();
            if !errors.is_empty() {
                return Err(errors.remove(0));
            }
        }

        let mut orders = self.orders.lock().unwrap();
        if orders.contains_key(&order.number) {
            return Err(StoreError::Duplicate("orders_pkey".to_string()));
        }

        let mut active = self.active.lock().unwrap();
        let booking = match active.get(&order.member_id) {
            Some(b) if b.id == order.booking_id => active.remove(&order.member_id).unwrap(),
            _ => {
                return Err(StoreError::Conflict(format!(
                    "booking {} is no longer active",
                    order.booking_id
                )))
            }
        };

        orders.insert(
            order.number.clone(),
            StoredOrder {
                order: order.clone(),
                booking,
                paid: false,
                raw: None,
            },
        );
        Ok(())
    }

    async fn record_payment(
        &self,
        number: &str,
        paid: bool,
        raw: &Value,
    ) -> Result<(), StoreError> {
        if self.record_payment_fails.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection reset".to_string()));
        }
        let mut orders = self.orders.lock().unwrap();
        let stored = orders
            .get_mut(number)
            .ok_or_else(|| StoreError::Conflict(format!("no order {number}")))?;
        stored.paid = paid;
        stored.raw = Some(raw.clone());
        Ok(())
    }

    async fn find_for_member(
        &self,
        member_id: i64,
        number: &str,
    ) -> Result<Option<OrderDetail>, StoreError> {
        let orders = self.orders.lock().unwrap();
        Ok(orders
            .get(number)
            .filter(|stored| stored.order.member_id == member_id)
            .map(|stored| OrderDetail {
                number: stored.order.number.clone(),
                price: stored.order.price,
                trip: Trip {
                    attraction: stored.booking.attraction.clone(),
                    date: stored.booking.date,
                    time: stored.booking.time,
                },
                contact: stored.order.contact.clone(),
                status: if stored.paid {
                    OrderStatus::Paid
                } else {
                    OrderStatus::Unpaid
                },
            }))
    }
}

pub struct ScriptedGateway {
    outcome: Mutex<ChargeOutcome>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChargeRequest>>,
}

impl ScriptedGateway {
    pub fn new(outcome: ChargeOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(outcome),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn approving() -> Arc<Self> {
        Self::new(ChargeOutcome::Approved {
            raw: json!({"status": 0, "msg": "OK"}),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_amount(&self) -> Option<i32> {
        self.last_request.lock().unwrap().as_ref().map(|r| r.amount)
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn charge(&self, request: &ChargeRequest) -> ChargeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.outcome.lock().unwrap().clone()
    }
}
