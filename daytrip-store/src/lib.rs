pub mod app_config;
pub mod attraction_repo;
pub mod booking_repo;
pub mod database;
pub mod member_repo;
pub mod order_repo;

pub use attraction_repo::PgAttractionRepository;
pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use member_repo::PgMemberRepository;
pub use order_repo::PgOrderRepository;

use daytrip_core::repository::StoreError;

pub(crate) fn map_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(db.constraint().unwrap_or("unknown").to_string())
        }
        _ => StoreError::Database(err.to_string()),
    }
}

/// JSONB image arrays store URLs; booking and order payloads expose only the
/// first one.
pub(crate) fn first_image(images: serde_json::Value) -> String {
    serde_json::from_value::<Vec<String>>(images)
        .ok()
        .and_then(|list| list.into_iter().next())
        .unwrap_or_default()
}
