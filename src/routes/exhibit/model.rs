use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::{CategoryRow, ExhibitRow, StorageRow};
use crate::validate::{max_len, non_empty, opt_max_len, positive};

#[derive(Debug, Deserialize)]
pub struct CreateExhibitRequest {
    pub name: String,
    pub description: String,
    pub date_of_creation: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub material: Option<String>,
    pub category_id: i64,
    pub storage_id: i64,
}

impl CreateExhibitRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_empty("name", &self.name)?;
        // Exhibit names are capped at 60, tighter than the 256 used for
        // category and storage names.
        max_len("name", &self.name, 60)?;
        non_empty("description", &self.description)?;
        opt_max_len("author", self.author.as_deref(), 256)?;
        opt_max_len("material", self.material.as_deref(), 256)?;
        positive("category_id", self.category_id)?;
        positive("storage_id", self.storage_id)
    }
}

/// Composite update: the nested category and storage objects are written back
/// alongside the exhibit row itself, all in one transaction.
#[derive(Debug, Deserialize)]
pub struct UpdateExhibitRequest {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date_of_creation: DateTime<Utc>,
    pub author: Option<String>,
    pub material: Option<String>,
    pub category: CategoryRow,
    pub storage: StorageRow,
}

impl UpdateExhibitRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_empty("name", &self.name)?;
        max_len("name", &self.name, 60)?;
        non_empty("description", &self.description)?;
        opt_max_len("author", self.author.as_deref(), 256)?;
        opt_max_len("material", self.material.as_deref(), 256)?;
        non_empty("category.name", &self.category.name)?;
        max_len("category.name", &self.category.name, 256)?;
        non_empty("storage.shelf", &self.storage.shelf)?;
        max_len("storage.shelf", &self.storage.shelf, 256)?;
        positive("storage.room_id", self.storage.room_id)
    }
}

/// The composite read shape: full category and storage objects, not bare
/// ids. Either may be `null` when the referent was deleted and the foreign
/// key nulled.
#[derive(Debug, Serialize)]
pub struct ExhibitResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date_of_creation: DateTime<Utc>,
    pub author: Option<String>,
    pub material: Option<String>,
    pub category: Option<CategoryRow>,
    pub storage: Option<StorageRow>,
}

impl ExhibitResponse {
    pub fn assemble(
        row: ExhibitRow,
        category: Option<CategoryRow>,
        storage: Option<StorageRow>,
    ) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            date_of_creation: row.date_of_creation,
            author: row.author,
            material: row.material,
            category,
            storage,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExhibitQuery {
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ExhibitDeleteQuery {
    pub id: i64,
}
