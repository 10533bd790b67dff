use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use daytrip_core::order::{Contact, Trip};
use daytrip_order::settlement::is_valid_order_number;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/order/{number}", get(get_order))
}

#[derive(Debug, Deserialize)]
struct OrderRequest {
    prime: String,
    order: OrderInput,
}

/// The client also sends price and trip data; the server ignores both and
/// copies price from the ACTIVE booking, so a tampered body cannot change
/// what is charged.
#[derive(Debug, Deserialize)]
struct OrderInput {
    contact: ContactRequest,
}

#[derive(Debug, Deserialize)]
struct ContactRequest {
    name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Serialize)]
struct OrderPayload {
    number: String,
    price: i32,
    trip: Trip,
    contact: Contact,
    status: u8,
}

async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<OrderRequest>,
) -> Result<Json<Value>, AppError> {
    if req.prime.trim().is_empty() {
        return Err(AppError::Validation("missing payment prime".to_string()));
    }
    let contact = validate_contact(req.order.contact)?;

    let receipt = state
        .settlement
        .create_order(claims.id, req.prime.trim(), &contact)
        .await?;

    Ok(Json(json!({ "data": receipt })))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(number): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !is_valid_order_number(&number) {
        return Err(AppError::Validation(
            "order number must be 20 lowercase hex characters".to_string(),
        ));
    }

    let payload = state
        .settlement
        .order_detail(claims.id, &number)
        .await?
        .map(|detail| OrderPayload {
            number: detail.number,
            price: detail.price,
            trip: detail.trip,
            contact: detail.contact,
            status: u8::from(detail.status.is_paid()),
        });

    Ok(Json(json!({ "data": payload })))
}

fn validate_contact(req: ContactRequest) -> Result<Contact, AppError> {
    let name = req.name.trim().to_string();
    if name.is_empty() || name.chars().count() > 50 {
        return Err(AppError::Validation(
            "contact name must be 1 to 50 characters".to_string(),
        ));
    }

    let email = req.email.trim().to_string();
    if !email.contains('@') {
        return Err(AppError::Validation(
            "contact email is not valid".to_string(),
        ));
    }

    let phone = req.phone.trim().to_string();
    if phone.len() != 10 || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Validation(
            "contact phone must be 10 digits".to_string(),
        ));
    }

    Ok(Contact { name, email, phone })
}
