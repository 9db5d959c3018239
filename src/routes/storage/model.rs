use serde::Deserialize;

use crate::error::ApiError;
use crate::validate::{max_len, non_empty, positive};

#[derive(Debug, Deserialize)]
pub struct CreateStorageRequest {
    pub room_id: i64,
    pub shelf: String,
}

impl CreateStorageRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive("room_id", self.room_id)?;
        non_empty("shelf", &self.shelf)?;
        max_len("shelf", &self.shelf, 256)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStorageRequest {
    pub id: i64,
    pub room_id: i64,
    pub shelf: String,
}

impl UpdateStorageRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive("room_id", self.room_id)?;
        non_empty("shelf", &self.shelf)?;
        max_len("shelf", &self.shelf, 256)
    }
}

#[derive(Debug, Deserialize)]
pub struct StorageQuery {
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StorageDeleteQuery {
    pub id: i64,
}
