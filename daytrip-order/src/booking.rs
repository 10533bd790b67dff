use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;

use daytrip_core::booking::{ActiveBooking, NewBooking};
use daytrip_core::repository::{AttractionRepository, BookingRepository, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("booking date {0} is in the past")]
    PastDate(NaiveDate),

    #[error("attraction {0} does not exist")]
    UnknownAttraction(i64),

    #[error("price must be a positive amount, got {0}")]
    InvalidPrice(i32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the single-ACTIVE-booking-per-member invariant. Validation happens
/// before any write; the demote-then-insert itself is atomic in the store.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    attractions: Arc<dyn AttractionRepository>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        attractions: Arc<dyn AttractionRepository>,
    ) -> Self {
        Self {
            bookings,
            attractions,
        }
    }

    pub async fn active_booking(
        &self,
        member_id: i64,
    ) -> Result<Option<ActiveBooking>, BookingError> {
        Ok(self.bookings.active_for_member(member_id).await?)
    }

    /// Any existing ACTIVE booking is superseded by the new one. A concurrent
    /// duplicate insert is rejected by the store's one-ACTIVE-per-member
    /// guard and surfaces as a retryable store error.
    pub async fn create_booking(
        &self,
        member_id: i64,
        booking: NewBooking,
    ) -> Result<(), BookingError> {
        if booking.price <= 0 {
            return Err(BookingError::InvalidPrice(booking.price));
        }
        // Date-only comparison against the server's local calendar.
        if booking.date < Local::now().date_naive() {
            return Err(BookingError::PastDate(booking.date));
        }
        if !self.attractions.exists(booking.attraction_id).await? {
            return Err(BookingError::UnknownAttraction(booking.attraction_id));
        }

        self.bookings.replace_active(member_id, &booking).await?;
        info!(
            member_id,
            attraction_id = booking.attraction_id,
            date = %booking.date,
            "booking created"
        );
        Ok(())
    }

    /// Idempotent: cancelling with no ACTIVE booking succeeds as a no-op.
    pub async fn cancel_booking(&self, member_id: i64) -> Result<(), BookingError> {
        self.bookings.supersede_active(member_id).await?;
        Ok(())
    }
}
