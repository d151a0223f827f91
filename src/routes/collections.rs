use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::collections::ItemUpdate;
use crate::error::AppError;
use crate::AppState;

#[derive(Deserialize)]
pub struct CollectionBody {
    title: String,
    note: Option<String>,
}

#[derive(Deserialize)]
pub struct ItemIdsBody {
    wata_ids: Vec<i64>,
}

#[derive(Deserialize)]
pub struct ItemUpdatesBody {
    items: Vec<ItemUpdate>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    skip: Option<i64>,
    take: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collections", post(create_collection))
        .route("/collections", get(list_collections))
        .route("/collections", delete(remove_all_collections))
        .route("/collections/{id}", put(update_collection))
        .route("/collections/{id}", delete(remove_collection))
        .route("/collections/{id}/items", post(add_items))
        .route("/collections/{id}/items", delete(remove_items))
        .route("/collections/items", put(update_items))
        // Share views take the opaque code, not the numeric id, and need
        // no login: the code itself is the capability.
        .route("/collections/shared/{code}", get(show_shared_collection))
        .route("/collections/shared/{code}/items", get(list_shared_items))
}

async fn create_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<CollectionBody>,
) -> Result<impl IntoResponse, AppError> {
    let created = state
        .collections
        .create(&user, body.title, body.note)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_collections(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.collections.find_all(&user).await?))
}

async fn update_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<CollectionBody>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .collections
        .update(&user, id, body.title, body.note)
        .await?;
    Ok(Json(updated))
}

async fn remove_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.collections.remove(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_all_collections(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.collections.remove_all(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_items(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ItemIdsBody>,
) -> Result<impl IntoResponse, AppError> {
    state
        .collections
        .add_items(&user, id, &body.wata_ids)
        .await?;
    Ok(StatusCode::CREATED)
}

async fn remove_items(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ItemIdsBody>,
) -> Result<impl IntoResponse, AppError> {
    state
        .collections
        .remove_items(&user, id, &body.wata_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_items(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<ItemUpdatesBody>,
) -> Result<impl IntoResponse, AppError> {
    state.collections.update_items(&user, &body.items).await?;
    // Echo the applied updates back, matching what was requested.
    Ok(Json(body.items))
}

async fn show_shared_collection(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.collections.find_shared(&code).await?))
}

async fn list_shared_items(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let skip = page.skip.unwrap_or(0).max(0);
    let take = page.take.unwrap_or(10).clamp(1, 100);

    Ok(Json(state.collections.find_items(&code, skip, take).await?))
}
