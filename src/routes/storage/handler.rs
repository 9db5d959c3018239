use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};

use crate::{AppState, error::ApiError, routes::OkBody, store::StorageRow};

use super::model::{
    CreateStorageRequest, StorageDeleteQuery, StorageQuery, UpdateStorageRequest,
};

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateStorageRequest>,
) -> Result<Json<StorageRow>, ApiError> {
    req.validate()?;
    let row = state.store.create_storage(req.room_id, &req.shelf).await?;
    Ok(Json(row))
}

pub async fn fetch(
    State(state): State<AppState>,
    Query(query): Query<StorageQuery>,
) -> Result<Response, ApiError> {
    match query.id {
        Some(id) => {
            let row = state
                .store
                .storage_by_id(id)
                .await?
                .ok_or(ApiError::NotFound)?;
            Ok(Json(row).into_response())
        }
        None => Ok(Json(state.store.storages().await?).into_response()),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateStorageRequest>,
) -> Result<Json<StorageRow>, ApiError> {
    req.validate()?;
    let row = state
        .store
        .update_storage(StorageRow {
            id: req.id,
            room_id: req.room_id,
            shelf: req.shelf,
        })
        .await?;
    Ok(Json(row))
}

/// Exhibits stored on the deleted shelf get their reference nulled.
pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<StorageDeleteQuery>,
) -> Result<Json<OkBody>, ApiError> {
    state.store.delete_storage(query.id).await?;
    Ok(Json(OkBody::new()))
}
