//! Field-level validation helpers shared by the request DTOs. Each failure
//! names the offending field and the violated constraint, and is raised
//! before any store operation runs.

use crate::error::ApiError;

pub fn non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn max_len(field: &str, value: &str, limit: usize) -> Result<(), ApiError> {
    if value.chars().count() > limit {
        return Err(ApiError::Validation(format!(
            "{field} must be at most {limit} characters"
        )));
    }
    Ok(())
}

pub fn opt_max_len(field: &str, value: Option<&str>, limit: usize) -> Result<(), ApiError> {
    match value {
        Some(v) => max_len(field, v, limit),
        None => Ok(()),
    }
}

pub fn positive(field: &str, value: i64) -> Result<(), ApiError> {
    if value <= 0 {
        return Err(ApiError::Validation(format!(
            "{field} must be a positive integer"
        )));
    }
    Ok(())
}

/// Password length is a business rule checked at the handler boundary, not a
/// schema constraint on the stored row.
pub fn password_min_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters long".into(),
        ));
    }
    Ok(())
}
