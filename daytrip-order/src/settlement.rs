use std::sync::Arc;

use chrono::Local;
use rand::RngCore;
use serde::Serialize;
use tracing::warn;

use daytrip_core::booking::ActiveBooking;
use daytrip_core::order::{Contact, NewOrder, OrderDetail};
use daytrip_core::payment::{ChargeOutcome, ChargeRequest, PaymentGateway};
use daytrip_core::repository::{BookingRepository, OrderRepository, StoreError};

/// Sortable second-precision timestamp plus six hex digits of entropy.
pub const ORDER_NUMBER_LEN: usize = 20;

/// Attempts at inserting the order before a number collision is surfaced.
const CREATE_ATTEMPTS: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("member {0} has no active booking")]
    NoActiveBooking(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Caller-facing payment outcome. Status 0 means settled; any other status is
/// a reportable, non-fatal failure whose message says which kind.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub status: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub number: String,
    pub payment: PaymentSummary,
}

/// Converts one ACTIVE booking into one order and settles it with the
/// external gateway.
///
/// The order row and the booking's ACTIVE → CONSUMED flip commit in one local
/// transaction *before* the gateway is called: holding a transaction across a
/// 30-second network call would serialize unrelated members' writes. The
/// committed row is the durable fact; the payment annotation afterwards is a
/// second, independent, best-effort write.
pub struct SettlementService {
    bookings: Arc<dyn BookingRepository>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl SettlementService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            bookings,
            orders,
            gateway,
        }
    }

    pub async fn create_order(
        &self,
        member_id: i64,
        prime: &str,
        contact: &Contact,
    ) -> Result<OrderReceipt, OrderError> {
        let booking = self
            .bookings
            .active_for_member(member_id)
            .await?
            .ok_or(OrderError::NoActiveBooking(member_id))?;

        let number = self
            .persist_unpaid(member_id, prime, contact, &booking)
            .await?;

        let outcome = self
            .gateway
            .charge(&ChargeRequest {
                prime: prime.to_string(),
                amount: booking.price,
                details: format!("Day trip order {number}"),
                contact: contact.clone(),
            })
            .await;

        let payment = self.reconcile(&number, outcome).await;
        Ok(OrderReceipt { number, payment })
    }

    pub async fn order_detail(
        &self,
        member_id: i64,
        number: &str,
    ) -> Result<Option<OrderDetail>, OrderError> {
        Ok(self.orders.find_for_member(member_id, number).await?)
    }

    /// Insert-and-consume with regenerate-and-retry on an order number
    /// collision. Price is copied from the booking here, never re-read later.
    async fn persist_unpaid(
        &self,
        member_id: i64,
        prime: &str,
        contact: &Contact,
        booking: &ActiveBooking,
    ) -> Result<String, OrderError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let number = generate_order_number();
            let order = NewOrder {
                number: number.clone(),
                booking_id: booking.id,
                member_id,
                prime: prime.to_string(),
                contact: contact.clone(),
                price: booking.price,
            };
            match self.orders.create_unpaid(&order).await {
                Ok(()) => return Ok(number),
                Err(StoreError::Duplicate(constraint)) if attempt < CREATE_ATTEMPTS => {
                    warn!(%number, %constraint, "order number collided, regenerating");
                }
                // The booking stopped being ACTIVE between lookup and
                // consumption (concurrent checkout or cancellation).
                Err(StoreError::Conflict(_)) => {
                    return Err(OrderError::NoActiveBooking(member_id))
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// The second, independent write. Its failure never fails the call: the
    /// order is already committed UNPAID and can be reconciled out-of-band.
    async fn reconcile(&self, number: &str, outcome: ChargeOutcome) -> PaymentSummary {
        let (paid, raw, summary) = match outcome {
            ChargeOutcome::Approved { raw } => (
                true,
                raw,
                PaymentSummary {
                    status: 0,
                    message: "payment processed".to_string(),
                },
            ),
            ChargeOutcome::Declined {
                status,
                message,
                raw,
            } => (false, raw, PaymentSummary { status, message }),
            ChargeOutcome::Indeterminate { message } => {
                warn!(%number, %message, "payment outcome indeterminate, order left unpaid");
                return PaymentSummary {
                    status: 1,
                    message: "bank connection failed".to_string(),
                };
            }
        };

        if let Err(err) = self.orders.record_payment(number, paid, &raw).await {
            // Known gap: an approved charge can be left UNPAID here.
            warn!(%number, paid, %err, "failed to persist payment record");
        }
        summary
    }
}

pub fn generate_order_number() -> String {
    let mut suffix = [0u8; 3];
    rand::thread_rng().fill_bytes(&mut suffix);
    format!(
        "{}{:02x}{:02x}{:02x}",
        Local::now().format("%Y%m%d%H%M%S"),
        suffix[0],
        suffix[1],
        suffix[2]
    )
}

/// 20 chars, digits and lowercase hex only.
pub fn is_valid_order_number(number: &str) -> bool {
    number.len() == ORDER_NUMBER_LEN
        && number
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
