use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};

use crate::{
    AppState,
    error::ApiError,
    routes::OkBody,
    utils::{decode_unverified, generate_token, verify_password, verify_token},
};

use super::model::{LoginRequest, LoginResponse};

/// `POST /api/v1/login` — verifies credentials and issues a bearer token.
///
/// An unknown username and a wrong password produce the exact same response,
/// so the endpoint cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .store
        .user_by_username(&req.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let matches = verify_password(&req.password, &user.password)
        .map_err(|e| ApiError::Internal(format!("password verification failed: {e}")))?;
    if !matches {
        return Err(ApiError::InvalidCredentials);
    }

    let (token, _) = generate_token(&user, &state.config)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;

    tracing::info!("user authenticated: {}", user.username);
    Ok(Json(LoginResponse {
        user_token: token,
        user_id: user.id,
    }))
}

/// `GET /api/v1/check` — validates the `Authorization: Bearer <token>` header.
pub async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OkBody>, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let claims = verify_token(header, &state.config).map_err(|err| {
        // Unverified claim; it only feeds the log line, never the decision.
        if let Some((_, token)) = header.split_once(' ') {
            if let Ok(claimed) = decode_unverified(token) {
                tracing::debug!("rejected token claiming to be {}", claimed.username);
            }
        }
        err
    })?;
    tracing::debug!("token accepted for user {}", claims.user.username);

    Ok(Json(OkBody::new()))
}
