use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};

use crate::{AppState, error::ApiError, routes::OkBody, store::CategoryRow};

use super::model::{
    CategoryDeleteQuery, CategoryQuery, CreateCategoryRequest, UpdateCategoryRequest,
};

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<CategoryRow>, ApiError> {
    req.validate()?;
    let row = state.store.create_category(&req.name).await?;
    Ok(Json(row))
}

pub async fn fetch(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Response, ApiError> {
    match query.id {
        Some(id) => {
            let row = state
                .store
                .category_by_id(id)
                .await?
                .ok_or(ApiError::NotFound)?;
            Ok(Json(row).into_response())
        }
        None => Ok(Json(state.store.categories().await?).into_response()),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryRow>, ApiError> {
    req.validate()?;
    let row = state
        .store
        .update_category(CategoryRow {
            id: req.id,
            name: req.name,
        })
        .await?;
    Ok(Json(row))
}

/// Exhibits referencing the deleted category keep their row; the reference
/// is nulled, not cascaded.
pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<CategoryDeleteQuery>,
) -> Result<Json<OkBody>, ApiError> {
    state.store.delete_category(query.id).await?;
    Ok(Json(OkBody::new()))
}
