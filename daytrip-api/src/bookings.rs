use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use daytrip_core::attraction::AttractionCard;
use daytrip_core::booking::{NewBooking, TimeSlot};

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/booking",
        get(get_booking).post(create_booking).delete(cancel_booking),
    )
}

#[derive(Debug, Serialize)]
struct BookingPayload {
    attraction: AttractionCard,
    date: NaiveDate,
    time: TimeSlot,
    price: i32,
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, AppError> {
    let payload = state
        .bookings
        .active_booking(claims.id)
        .await?
        .map(|booking| BookingPayload {
            attraction: booking.attraction,
            date: booking.date,
            time: booking.time,
            price: booking.price,
        });

    Ok(Json(json!({ "data": payload })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingRequest {
    attraction_id: i64,
    date: NaiveDate,
    time: TimeSlot,
    price: i32,
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .bookings
        .create_booking(
            claims.id,
            NewBooking {
                attraction_id: req.attraction_id,
                date: req.date,
                time: req.time,
                price: req.price,
            },
        )
        .await?;

    Ok(Json(json!({ "ok": true })))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, AppError> {
    state.bookings.cancel_booking(claims.id).await?;
    Ok(Json(json!({ "ok": true })))
}
