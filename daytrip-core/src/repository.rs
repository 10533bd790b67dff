use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::attraction::Attraction;
use crate::booking::{ActiveBooking, NewBooking};
use crate::member::MemberRecord;
use crate::order::{NewOrder, OrderDetail};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write: duplicate email, duplicate
    /// order number, or a second ACTIVE booking for the same member.
    #[error("duplicate key on {0}")]
    Duplicate(String),

    /// The row a transition expected was not in the expected state.
    #[error("conflicting state: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, StoreError>;
}

#[async_trait]
pub trait AttractionRepository: Send + Sync {
    /// One page of attractions, optionally filtered by category and/or a
    /// keyword matching the MRT station exactly or the name as infix.
    async fn list(
        &self,
        page: u32,
        category: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<Vec<Attraction>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Attraction>, StoreError>;

    async fn exists(&self, id: i64) -> Result<bool, StoreError>;

    async fn categories(&self) -> Result<Vec<String>, StoreError>;

    async fn mrts(&self) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn active_for_member(
        &self,
        member_id: i64,
    ) -> Result<Option<ActiveBooking>, StoreError>;

    /// Demote any ACTIVE booking to SUPERSEDED and insert the replacement as
    /// one atomic unit, so a concurrent call observes zero or one ACTIVE row,
    /// never two.
    async fn replace_active(
        &self,
        member_id: i64,
        booking: &NewBooking,
    ) -> Result<(), StoreError>;

    /// ACTIVE → SUPERSEDED. Succeeds as a no-op when nothing is ACTIVE.
    async fn supersede_active(&self, member_id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the UNPAID order and flip its booking ACTIVE → CONSUMED in one
    /// transaction. `Conflict` when the booking is no longer ACTIVE,
    /// `Duplicate` when the order number already exists; in both cases
    /// nothing is written.
    async fn create_unpaid(&self, order: &NewOrder) -> Result<(), StoreError>;

    /// The single post-settlement annotation write: stores the raw gateway
    /// response and, for an approved charge, marks the order PAID.
    async fn record_payment(
        &self,
        number: &str,
        paid: bool,
        raw: &Value,
    ) -> Result<(), StoreError>;

    /// Scoped to the requesting member: a foreign order number yields `None`.
    async fn find_for_member(
        &self,
        member_id: i64,
        number: &str,
    ) -> Result<Option<OrderDetail>, StoreError>;
}
