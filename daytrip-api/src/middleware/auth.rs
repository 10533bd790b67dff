use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use daytrip_core::member::Member;

use crate::error::AppError;
use crate::state::AppState;

/// Session tokens expire a fixed seven days after issuance.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub exp: usize,
}

pub fn issue_token(member: &Member, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        id: member.id,
        name: member.name.clone(),
        email: member.email.clone(),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// `None` on a malformed or expired token; never an error.
pub fn decode_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Claims from the Authorization header, if a valid bearer token is present.
pub fn claims_from_headers(headers: &HeaderMap, secret: &str) -> Option<Claims> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| decode_token(token, secret))
}

/// Rejects before any handler runs, so an unauthenticated request can never
/// mutate state.
pub async fn require_member(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    match claims_from_headers(req.headers(), &state.auth.secret) {
        Some(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        None => Err(AppError::Auth("not signed in".to_string()).into_response()),
    }
}
