use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    error::ApiError,
    routes::OkBody,
    store::{RoomRow, StoreError},
};

use super::model::{RoomDeleteQuery, RoomRequest, UpdateRoomRequest};

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<RoomRequest>,
) -> Result<Json<RoomRow>, ApiError> {
    req.validate()?;
    let row = state.store.create_room(req.room).await?;
    Ok(Json(row))
}

pub async fn fetch(State(state): State<AppState>) -> Result<Json<Vec<RoomRow>>, ApiError> {
    Ok(Json(state.store.rooms().await?))
}

/// Room numbers are the primary key, so an update is a rename from
/// `old_room` to `new_room`.
pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateRoomRequest>,
) -> Result<Json<RoomRow>, ApiError> {
    req.validate()?;
    let row = state.store.rename_room(req.old_room, req.new_room).await?;
    Ok(Json(row))
}

pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<RoomDeleteQuery>,
) -> Result<Json<OkBody>, ApiError> {
    state
        .store
        .delete_room(query.number)
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(_) => {
                ApiError::Conflict("Room is still referenced by storage or activities".into())
            }
            other => other.into(),
        })?;
    Ok(Json(OkBody::new()))
}
