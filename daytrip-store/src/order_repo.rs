use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::PgPool;

use daytrip_core::attraction::AttractionCard;
use daytrip_core::booking::TimeSlot;
use daytrip_core::order::{Contact, NewOrder, OrderDetail, OrderStatus, Trip};
use daytrip_core::repository::{OrderRepository, StoreError};

use crate::{first_image, map_err};

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_number: String,
    price: i32,
    contact_name: String,
    contact_email: String,
    contact_phone: String,
    status: String,
    booking_date: NaiveDate,
    booking_time: String,
    attraction_id: i64,
    attraction_name: String,
    attraction_address: String,
    images: Value,
}

impl OrderRow {
    fn into_detail(self) -> Result<OrderDetail, StoreError> {
        let status = OrderStatus::parse(self.status.trim()).ok_or_else(|| {
            StoreError::Database(format!("unexpected order status {:?}", self.status))
        })?;
        let time = TimeSlot::parse(&self.booking_time).ok_or_else(|| {
            StoreError::Database(format!("unexpected booking_time {:?}", self.booking_time))
        })?;
        Ok(OrderDetail {
            number: self.order_number.trim().to_string(),
            price: self.price,
            trip: Trip {
                attraction: AttractionCard {
                    id: self.attraction_id,
                    name: self.attraction_name,
                    address: self.attraction_address,
                    image: first_image(self.images),
                },
                date: self.booking_date,
                time,
            },
            contact: Contact {
                name: self.contact_name,
                email: self.contact_email,
                phone: self.contact_phone.trim().to_string(),
            },
            status,
        })
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_unpaid(&self, order: &NewOrder) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;

        sqlx::query(
            "INSERT INTO orders \
             (order_number, booking_id, member_id, prime, \
              contact_name, contact_email, contact_phone, price, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'UNPAID')",
        )
        .bind(&order.number)
        .bind(order.booking_id)
        .bind(order.member_id)
        .bind(&order.prime)
        .bind(&order.contact.name)
        .bind(&order.contact.email)
        .bind(&order.contact.phone)
        .bind(order.price)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        let consumed = sqlx::query(
            "UPDATE bookings SET status = 'CONSUMED' WHERE id = $1 AND status = 'ACTIVE'",
        )
        .bind(order.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        if consumed.rows_affected() != 1 {
            // Dropping the transaction rolls the insert back.
            return Err(StoreError::Conflict(format!(
                "booking {} is no longer active",
                order.booking_id
            )));
        }

        tx.commit().await.map_err(map_err)
    }

    async fn record_payment(
        &self,
        number: &str,
        paid: bool,
        raw: &Value,
    ) -> Result<(), StoreError> {
        let sql = if paid {
            "UPDATE orders SET status = 'PAID', payment_record = $1 WHERE order_number = $2"
        } else {
            "UPDATE orders SET payment_record = $1 WHERE order_number = $2"
        };
        sqlx::query(sql)
            .bind(raw)
            .bind(number)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn find_for_member(
        &self,
        member_id: i64,
        number: &str,
    ) -> Result<Option<OrderDetail>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT o.order_number, o.price, o.contact_name, o.contact_email, \
                    o.contact_phone, o.status, \
                    b.booking_date, b.booking_time, \
                    a.id AS attraction_id, a.name AS attraction_name, \
                    a.address AS attraction_address, a.images \
             FROM orders o \
             JOIN bookings b ON b.id = o.booking_id \
             JOIN attractions a ON a.id = b.attraction_id \
             WHERE o.order_number = $1 AND o.member_id = $2",
        )
        .bind(number)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;

        row.map(OrderRow::into_detail).transpose()
    }
}
