use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use daytrip_core::attraction::PAGE_SIZE;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/attractions", get(list_attractions))
        .route("/attraction/{id}", get(get_attraction))
        .route("/categories", get(list_categories))
        .route("/mrts", get(list_mrts))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    page: u32,
    category: Option<String>,
    keyword: Option<String>,
}

async fn list_attractions(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    // A malformed query string (e.g. a negative page) gets the same JSON
    // error shape as every other client error.
    let Query(query) = query.map_err(|err| AppError::Validation(err.body_text()))?;
    let category = query.category.as_deref().filter(|s| !s.is_empty());
    let keyword = query.keyword.as_deref().filter(|s| !s.is_empty());

    let attractions = state.attractions.list(query.page, category, keyword).await?;

    // A full page means there may be more; a short page is the last one.
    let next_page = (attractions.len() == PAGE_SIZE).then(|| query.page + 1);
    Ok(Json(json!({
        "nextPage": next_page,
        "data": attractions,
    })))
}

async fn get_attraction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let attraction = state
        .attractions
        .get(id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("attraction {id} does not exist")))?;

    Ok(Json(json!({ "data": attraction })))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let categories = state.attractions.categories().await?;
    Ok(Json(json!({ "data": categories })))
}

async fn list_mrts(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let mrts = state.attractions.mrts().await?;
    Ok(Json(json!({ "data": mrts })))
}
