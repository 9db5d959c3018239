use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::validate::positive;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub user_id: i64,
    pub activity_id: i64,
    pub cost: f64,
}

impl CreateTicketRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive("user_id", self.user_id)?;
        positive("activity_id", self.activity_id)?;
        if !self.cost.is_finite() {
            return Err(ApiError::Validation("cost must be a finite number".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub id: Uuid,
    pub user_id: i64,
    pub activity_id: i64,
    pub cost: f64,
    pub date: DateTime<Utc>,
    pub visited: bool,
}

impl UpdateTicketRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive("user_id", self.user_id)?;
        positive("activity_id", self.activity_id)?;
        if !self.cost.is_finite() {
            return Err(ApiError::Validation("cost must be a finite number".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TicketDeleteQuery {
    pub id: Uuid,
}
