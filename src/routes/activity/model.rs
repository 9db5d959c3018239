use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ApiError;
use crate::validate::{max_len, non_empty, positive};

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub name: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    pub room_id: i64,
}

impl CreateActivityRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_empty("name", &self.name)?;
        max_len("name", &self.name, 256)?;
        non_empty("description", &self.description)?;
        positive("room_id", self.room_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateActivityRequest {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub room_id: i64,
}

impl UpdateActivityRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_empty("name", &self.name)?;
        max_len("name", &self.name, 256)?;
        non_empty("description", &self.description)?;
        positive("room_id", self.room_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityDeleteQuery {
    pub id: i64,
}
