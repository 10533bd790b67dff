use axum::{
    extract::State,
    http::HeaderMap,
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use daytrip_core::member::Member;
use daytrip_core::repository::StoreError;

use crate::error::AppError;
use crate::middleware::auth::{claims_from_headers, issue_token};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(signup))
        .route("/user/auth", put(signin).get(current_member))
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SigninRequest {
    email: String,
    password: String,
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<Value>, AppError> {
    let name = req.name.trim();
    let email = req.email.trim().to_lowercase();
    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "name, email and password are required".to_string(),
        ));
    }
    if req.password.len() > 50 {
        return Err(AppError::Validation(
            "password must be at most 50 characters".to_string(),
        ));
    }
    if state.members.find_by_email(&email).await?.is_some() {
        return Err(AppError::Validation(
            "email is already registered".to_string(),
        ));
    }

    let hash = hash_password(&req.password)
        .map_err(|err| AppError::Internal(format!("password hashing failed: {err}")))?;

    match state.members.create(name, &email, &hash).await {
        Ok(()) => Ok(Json(json!({ "ok": true }))),
        // Lost the race against a concurrent signup with the same email.
        Err(StoreError::Duplicate(_)) => Err(AppError::Validation(
            "email is already registered".to_string(),
        )),
        Err(err) => Err(err.into()),
    }
}

async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<Value>, AppError> {
    let email = req.email.trim().to_lowercase();
    let record = state
        .members
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Validation("unknown email address".to_string()))?;

    if !verify_password(&req.password, &record.password_hash) {
        return Err(AppError::Validation("incorrect password".to_string()));
    }

    let member = Member {
        id: record.id,
        name: record.name,
        email: record.email,
    };
    let token = issue_token(&member, &state.auth.secret)
        .map_err(|err| AppError::Internal(format!("token encoding failed: {err}")))?;

    Ok(Json(json!({ "token": token })))
}

/// Optional auth: no token or a bad token is `data: null`, never an error.
async fn current_member(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    match claims_from_headers(&headers, &state.auth.secret) {
        Some(claims) => Json(json!({
            "data": { "id": claims.id, "name": claims.name, "email": claims.email }
        })),
        None => Json(json!({ "data": null })),
    }
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
