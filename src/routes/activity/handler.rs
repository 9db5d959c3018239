use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    AppState,
    error::ApiError,
    routes::OkBody,
    store::{ActivityRow, NewActivity, StoreError},
};

use super::model::{
    ActivityDeleteQuery, ActivityQuery, CreateActivityRequest, UpdateActivityRequest,
};

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateActivityRequest>,
) -> Result<Json<ActivityRow>, ApiError> {
    req.validate()?;
    let row = state
        .store
        .create_activity(NewActivity {
            name: req.name,
            description: req.description,
            date: req.date.unwrap_or_else(Utc::now),
            room_id: req.room_id,
        })
        .await?;
    Ok(Json(row))
}

pub async fn fetch(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Response, ApiError> {
    match query.id {
        Some(id) => {
            let row = state
                .store
                .activity_by_id(id)
                .await?
                .ok_or(ApiError::NotFound)?;
            Ok(Json(row).into_response())
        }
        None => Ok(Json(state.store.activities().await?).into_response()),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateActivityRequest>,
) -> Result<Json<ActivityRow>, ApiError> {
    req.validate()?;
    let row = state
        .store
        .update_activity(ActivityRow {
            id: req.id,
            name: req.name,
            description: req.description,
            date: req.date,
            room_id: req.room_id,
        })
        .await?;
    Ok(Json(row))
}

pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<ActivityDeleteQuery>,
) -> Result<Json<OkBody>, ApiError> {
    state
        .store
        .delete_activity(query.id)
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(_) => {
                ApiError::Conflict("Activity is still referenced by tickets".into())
            }
            other => other.into(),
        })?;
    Ok(Json(OkBody::new()))
}
