use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    error::ApiError,
    routes::OkBody,
    store::{NewUser, StoreError, UserRow},
    utils::hash_password,
    validate::password_min_len,
};

use super::model::{
    CreateUserRequest, UpdateUserRequest, UserDeleteQuery, UserQuery, UserResponse,
};

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;
    password_min_len(&req.password)?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let row = state
        .store
        .create_user(NewUser {
            username: req.username,
            password_hash,
            fullname: req.fullname,
            email: req.email,
            phone: req.phone,
            staff: req.staff,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => ApiError::Conflict("User already exists".into()),
            other => other.into(),
        })?;

    tracing::info!("user created: {}", row.username);
    Ok(Json(row.into()))
}

pub async fn fetch(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Response, ApiError> {
    if let Some(id) = query.id {
        let row = state.store.user_by_id(id).await?.ok_or(ApiError::NotFound)?;
        return Ok(Json(UserResponse::from(row)).into_response());
    }
    if let Some(username) = query.username {
        let row = state
            .store
            .user_by_username(&username)
            .await?
            .ok_or(ApiError::NotFound)?;
        return Ok(Json(UserResponse::from(row)).into_response());
    }

    let rows = state.store.users().await?;
    let users: Vec<UserResponse> = rows.into_iter().map(UserResponse::from).collect();
    Ok(Json(users).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;
    password_min_len(&req.password)?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let row = state
        .store
        .update_user(UserRow {
            id: req.id,
            username: req.username,
            password: password_hash,
            fullname: req.fullname,
            email: req.email,
            phone: req.phone,
            staff: req.staff,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => ApiError::Conflict("User already exists".into()),
            other => other.into(),
        })?;

    Ok(Json(row.into()))
}

pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<UserDeleteQuery>,
) -> Result<Json<OkBody>, ApiError> {
    state.store.delete_user(query.id).await.map_err(|e| match e {
        StoreError::ForeignKeyViolation(_) => {
            ApiError::Conflict("User is still referenced by tickets".into())
        }
        other => other.into(),
    })?;
    Ok(Json(OkBody::new()))
}
