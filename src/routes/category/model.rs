use serde::Deserialize;

use crate::error::ApiError;
use crate::validate::{max_len, non_empty};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_empty("name", &self.name)?;
        max_len("name", &self.name, 256)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub id: i64,
    pub name: String,
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_empty("name", &self.name)?;
        max_len("name", &self.name, 256)
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryDeleteQuery {
    pub id: i64,
}
