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
    store::{ExhibitRow, NewExhibit, Store},
};

use super::model::{
    CreateExhibitRequest, ExhibitDeleteQuery, ExhibitQuery, ExhibitResponse, UpdateExhibitRequest,
};

/// Assembles the composite response for one exhibit row. The two referenced
/// rows are independent reads, so they are fetched concurrently.
///
/// A nulled foreign key comes back as an explicit `null` field. A non-null id
/// that no longer resolves is a dangling reference; it is logged and then
/// represented the same way rather than failing the whole request.
async fn compose(store: &dyn Store, row: ExhibitRow) -> Result<ExhibitResponse, ApiError> {
    let (category, storage) = tokio::join!(
        async {
            match row.category_id {
                Some(id) => store.category_by_id(id).await,
                None => Ok(None),
            }
        },
        async {
            match row.storage_id {
                Some(id) => store.storage_by_id(id).await,
                None => Ok(None),
            }
        }
    );
    let category = category?;
    let storage = storage?;

    if row.category_id.is_some() && category.is_none() {
        tracing::warn!(
            "exhibit {} references missing category {:?}",
            row.id,
            row.category_id
        );
    }
    if row.storage_id.is_some() && storage.is_none() {
        tracing::warn!(
            "exhibit {} references missing storage {:?}",
            row.id,
            row.storage_id
        );
    }

    Ok(ExhibitResponse::assemble(row, category, storage))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateExhibitRequest>,
) -> Result<Json<ExhibitResponse>, ApiError> {
    req.validate()?;
    let row = state
        .store
        .create_exhibit(NewExhibit {
            name: req.name,
            description: req.description,
            date_of_creation: req.date_of_creation.unwrap_or_else(Utc::now),
            author: req.author,
            material: req.material,
            category_id: req.category_id,
            storage_id: req.storage_id,
        })
        .await?;
    let composite = compose(state.store.as_ref(), row).await?;
    Ok(Json(composite))
}

pub async fn fetch(
    State(state): State<AppState>,
    Query(query): Query<ExhibitQuery>,
) -> Result<Response, ApiError> {
    match query.id {
        Some(id) => {
            let row = state
                .store
                .exhibit_by_id(id)
                .await?
                .ok_or(ApiError::NotFound)?;
            let composite = compose(state.store.as_ref(), row).await?;
            Ok(Json(composite).into_response())
        }
        None => {
            let rows = state.store.exhibits().await?;
            let mut composites = Vec::with_capacity(rows.len());
            for row in rows {
                composites.push(compose(state.store.as_ref(), row).await?);
            }
            Ok(Json(composites).into_response())
        }
    }
}

/// Writes the nested category and storage objects and the exhibit row in one
/// store transaction, then re-assembles the composite from fresh lookups.
pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateExhibitRequest>,
) -> Result<Json<ExhibitResponse>, ApiError> {
    req.validate()?;

    let row = state
        .store
        .update_exhibit_composite(
            ExhibitRow {
                id: req.id,
                name: req.name,
                description: req.description,
                date_of_creation: req.date_of_creation,
                author: req.author,
                material: req.material,
                category_id: Some(req.category.id),
                storage_id: Some(req.storage.id),
            },
            req.category,
            req.storage,
        )
        .await?;

    let composite = compose(state.store.as_ref(), row).await?;
    Ok(Json(composite))
}

pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<ExhibitDeleteQuery>,
) -> Result<Json<OkBody>, ApiError> {
    state.store.delete_exhibit(query.id).await?;
    Ok(Json(OkBody::new()))
}
