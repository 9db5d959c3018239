use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod mem;
mod pg;

pub use mem::MemStore;
pub use pg::PgStore;

/// Store-level failures. Referential-integrity and uniqueness violations are
/// distinguishable so handlers can translate them to 404/409; everything else
/// is an opaque backend failure.
#[derive(Debug)]
pub enum StoreError {
    NotFound,
    UniqueViolation(String),
    ForeignKeyViolation(String),
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "row not found"),
            StoreError::UniqueViolation(what) => write!(f, "unique violation on {what}"),
            StoreError::ForeignKeyViolation(what) => write!(f, "foreign key violation on {what}"),
            StoreError::Backend(detail) => write!(f, "backend error: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub fullname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub staff: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Already bcrypt-hashed; the store never sees a plaintext secret.
    pub password_hash: String,
    pub fullname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub staff: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoomRow {
    pub room: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StorageRow {
    pub id: i64,
    pub room_id: i64,
    pub shelf: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExhibitRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date_of_creation: DateTime<Utc>,
    pub author: Option<String>,
    pub material: Option<String>,
    pub category_id: Option<i64>,
    pub storage_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewExhibit {
    pub name: String,
    pub description: String,
    pub date_of_creation: DateTime<Utc>,
    pub author: Option<String>,
    pub material: Option<String>,
    pub category_id: i64,
    pub storage_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub room_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub room_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketRow {
    pub id: Uuid,
    pub user_id: i64,
    pub activity_id: i64,
    pub cost: f64,
    pub date: DateTime<Utc>,
    pub visited: bool,
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub user_id: i64,
    pub activity_id: i64,
    pub cost: f64,
}

/// Transactional CRUD over the museum schema, one group of operations per
/// entity. Implemented by [`PgStore`] for production and [`MemStore`] for
/// tests and database-less runs.
#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow>;
    async fn user_by_id(&self, id: i64) -> StoreResult<Option<UserRow>>;
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>>;
    async fn users(&self) -> StoreResult<Vec<UserRow>>;
    async fn update_user(&self, user: UserRow) -> StoreResult<UserRow>;
    async fn delete_user(&self, id: i64) -> StoreResult<()>;

    // rooms
    async fn create_room(&self, room: i64) -> StoreResult<RoomRow>;
    async fn rooms(&self) -> StoreResult<Vec<RoomRow>>;
    async fn rename_room(&self, old_room: i64, new_room: i64) -> StoreResult<RoomRow>;
    async fn delete_room(&self, room: i64) -> StoreResult<()>;

    // categories
    async fn create_category(&self, name: &str) -> StoreResult<CategoryRow>;
    async fn category_by_id(&self, id: i64) -> StoreResult<Option<CategoryRow>>;
    async fn categories(&self) -> StoreResult<Vec<CategoryRow>>;
    async fn update_category(&self, category: CategoryRow) -> StoreResult<CategoryRow>;
    async fn delete_category(&self, id: i64) -> StoreResult<()>;

    // storages
    async fn create_storage(&self, room_id: i64, shelf: &str) -> StoreResult<StorageRow>;
    async fn storage_by_id(&self, id: i64) -> StoreResult<Option<StorageRow>>;
    async fn storages(&self) -> StoreResult<Vec<StorageRow>>;
    async fn update_storage(&self, storage: StorageRow) -> StoreResult<StorageRow>;
    async fn delete_storage(&self, id: i64) -> StoreResult<()>;

    // exhibits
    async fn create_exhibit(&self, exhibit: NewExhibit) -> StoreResult<ExhibitRow>;
    async fn exhibit_by_id(&self, id: i64) -> StoreResult<Option<ExhibitRow>>;
    async fn exhibits(&self) -> StoreResult<Vec<ExhibitRow>>;
    /// Updates the referenced category and storage rows together with the
    /// exhibit itself in a single transaction; either all three commit or
    /// none do.
    async fn update_exhibit_composite(
        &self,
        exhibit: ExhibitRow,
        category: CategoryRow,
        storage: StorageRow,
    ) -> StoreResult<ExhibitRow>;
    async fn delete_exhibit(&self, id: i64) -> StoreResult<()>;

    // activities
    async fn create_activity(&self, activity: NewActivity) -> StoreResult<ActivityRow>;
    async fn activity_by_id(&self, id: i64) -> StoreResult<Option<ActivityRow>>;
    async fn activities(&self) -> StoreResult<Vec<ActivityRow>>;
    async fn update_activity(&self, activity: ActivityRow) -> StoreResult<ActivityRow>;
    async fn delete_activity(&self, id: i64) -> StoreResult<()>;

    // tickets
    async fn create_ticket(&self, ticket: NewTicket) -> StoreResult<TicketRow>;
    async fn ticket_by_id(&self, id: Uuid) -> StoreResult<Option<TicketRow>>;
    async fn tickets(&self) -> StoreResult<Vec<TicketRow>>;
    async fn update_ticket(&self, ticket: TicketRow) -> StoreResult<TicketRow>;
    async fn delete_ticket(&self, id: Uuid) -> StoreResult<()>;
}
