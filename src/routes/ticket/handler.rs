use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    error::ApiError,
    routes::OkBody,
    store::{NewTicket, TicketRow},
};

use super::model::{
    CreateTicketRequest, TicketDeleteQuery, TicketQuery, UpdateTicketRequest,
};

/// Ticket identifiers are random UUIDs so they cannot be enumerated the way
/// sequential ids can.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<Json<TicketRow>, ApiError> {
    req.validate()?;
    let row = state
        .store
        .create_ticket(NewTicket {
            user_id: req.user_id,
            activity_id: req.activity_id,
            cost: req.cost,
        })
        .await?;
    Ok(Json(row))
}

pub async fn fetch(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> Result<Response, ApiError> {
    match query.id {
        Some(id) => {
            let row = state
                .store
                .ticket_by_id(id)
                .await?
                .ok_or(ApiError::NotFound)?;
            Ok(Json(row).into_response())
        }
        None => Ok(Json(state.store.tickets().await?).into_response()),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<TicketRow>, ApiError> {
    req.validate()?;
    let row = state
        .store
        .update_ticket(TicketRow {
            id: req.id,
            user_id: req.user_id,
            activity_id: req.activity_id,
            cost: req.cost,
            date: req.date,
            visited: req.visited,
        })
        .await?;
    Ok(Json(row))
}

pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<TicketDeleteQuery>,
) -> Result<Json<OkBody>, ApiError> {
    state.store.delete_ticket(query.id).await?;
    Ok(Json(OkBody::new()))
}
