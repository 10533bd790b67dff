use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::attraction::AttractionCard;

/// Half-day slot of the booked trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
}

impl TimeSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "morning" => Some(TimeSlot::Morning),
            "afternoon" => Some(TimeSlot::Afternoon),
            _ => None,
        }
    }
}

/// Booking lifecycle. Rows are never deleted; status is the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// The member's single in-progress trip selection.
    Active,
    /// Replaced by a newer booking, or cancelled by the member.
    Superseded,
    /// An order was created from this booking.
    Consumed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "ACTIVE",
            BookingStatus::Superseded => "SUPERSEDED",
            BookingStatus::Consumed => "CONSUMED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(BookingStatus::Active),
            "SUPERSEDED" => Some(BookingStatus::Superseded),
            "CONSUMED" => Some(BookingStatus::Consumed),
            _ => None,
        }
    }

    /// SUPERSEDED and CONSUMED are terminal for a booking instance.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Active, BookingStatus::Superseded)
                | (BookingStatus::Active, BookingStatus::Consumed)
        )
    }
}

/// Input for a new booking, prior to validation.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub attraction_id: i64,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub price: i32,
}

/// The member's ACTIVE booking joined with its attraction.
#[derive(Debug, Clone)]
pub struct ActiveBooking {
    pub id: i64,
    pub attraction: AttractionCard,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub price: i32,
}
