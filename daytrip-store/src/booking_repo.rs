use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use daytrip_core::attraction::AttractionCard;
use daytrip_core::booking::{ActiveBooking, NewBooking, TimeSlot};
use daytrip_core::repository::{BookingRepository, StoreError};

use crate::{first_image, map_err};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ActiveBookingRow {
    id: i64,
    booking_date: NaiveDate,
    booking_time: String,
    price: i32,
    attraction_id: i64,
    attraction_name: String,
    attraction_address: String,
    images: serde_json::Value,
}

impl ActiveBookingRow {
    fn into_booking(self) -> Result<ActiveBooking, StoreError> {
        let time = TimeSlot::parse(&self.booking_time).ok_or_else(|| {
            StoreError::Database(format!("unexpected booking_time {:?}", self.booking_time))
        })?;
        Ok(ActiveBooking {
            id: self.id,
            attraction: AttractionCard {
                id: self.attraction_id,
                name: self.attraction_name,
                address: self.attraction_address,
                image: first_image(self.images),
            },
            date: self.booking_date,
            time,
            price: self.price,
        })
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn active_for_member(
        &self,
        member_id: i64,
    ) -> Result<Option<ActiveBooking>, StoreError> {
        let row = sqlx::query_as::<_, ActiveBookingRow>(
            "SELECT b.id, b.booking_date, b.booking_time, b.price, \
                    a.id AS attraction_id, a.name AS attraction_name, \
                    a.address AS attraction_address, a.images \
             FROM bookings b \
             JOIN attractions a ON a.id = b.attraction_id \
             WHERE b.member_id = $1 AND b.status = 'ACTIVE'",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;

        row.map(ActiveBookingRow::into_booking).transpose()
    }

    async fn replace_active(
        &self,
        member_id: i64,
        booking: &NewBooking,
    ) -> Result<(), StoreError> {
        // One transaction: a concurrent reader sees the old ACTIVE row or the
        // new one, never both. If two replacements race, the partial unique
        // index on (member_id) WHERE status = 'ACTIVE' fails the second insert.
        let mut tx = self.pool.begin().await.map_err(map_err)?;

        sqlx::query(
            "UPDATE bookings SET status = 'SUPERSEDED' \
             WHERE member_id = $1 AND status = 'ACTIVE'",
        )
        .bind(member_id)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        sqlx::query(
            "INSERT INTO bookings \
             (member_id, attraction_id, booking_date, booking_time, price, status) \
             VALUES ($1, $2, $3, $4, $5, 'ACTIVE')",
        )
        .bind(member_id)
        .bind(booking.attraction_id)
        .bind(booking.date)
        .bind(booking.time.as_str())
        .bind(booking.price)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        tx.commit().await.map_err(map_err)
    }

    async fn supersede_active(&self, member_id: i64) -> Result<(), StoreError> {
        // Zero affected rows is fine: cancellation is idempotent.
        sqlx::query(
            "UPDATE bookings SET status = 'SUPERSEDED' \
             WHERE member_id = $1 AND status = 'ACTIVE'",
        )
        .bind(member_id)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(())
    }
}
