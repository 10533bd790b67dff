use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::attraction::AttractionCard;
use crate::booking::TimeSlot;

/// Orders start UNPAID and are mutated exactly once more to attach the
/// payment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Unpaid,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Unpaid => "UNPAID",
            OrderStatus::Paid => "PAID",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "UNPAID" => Some(OrderStatus::Unpaid),
            "PAID" => Some(OrderStatus::Paid),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        *self == OrderStatus::Paid
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Everything the store needs to record a checkout attempt atomically.
/// `price` is copied from the booking, not referenced, so later attraction
/// price changes cannot alter a settled order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub number: String,
    pub booking_id: i64,
    pub member_id: i64,
    pub prime: String,
    pub contact: Contact,
    pub price: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trip {
    pub attraction: AttractionCard,
    pub date: NaiveDate,
    pub time: TimeSlot,
}

/// Read model for `GET /api/order/{number}`.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub number: String,
    pub price: i32,
    pub trip: Trip,
    pub contact: Contact,
    pub status: OrderStatus,
}
