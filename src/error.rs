use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::store::StoreError;

/// Error taxonomy for the whole API surface. Every handler returns
/// `Result<_, ApiError>`; nothing reaches the transport layer unhandled.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or out-of-bounds input, rejected before any store call.
    Validation(String),
    /// Bad username or password. Deliberately one variant for both causes
    /// so the response cannot be used to enumerate usernames.
    InvalidCredentials,
    /// Missing, malformed, tampered or expired token. The client-visible
    /// message never distinguishes which.
    Unauthorized,
    NotFound,
    Conflict(String),
    /// Unexpected failure; detail is logged server-side, never returned.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "Invalid username or password".to_string(),
            ),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::UniqueViolation(what) => {
                ApiError::Conflict(format!("{what} already exists"))
            }
            // An insert/update naming a row that does not exist.
            StoreError::ForeignKeyViolation(_) => ApiError::NotFound,
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_share_one_message() {
        // Both bad-password and unknown-username map to this variant, so a
        // single body string is the whole anti-enumeration guarantee.
        let resp = ApiError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err: ApiError = StoreError::UniqueViolation("user".into()).into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }
}
