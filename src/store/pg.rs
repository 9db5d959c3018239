use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::{
    ActivityRow, CategoryRow, ExhibitRow, NewActivity, NewExhibit, NewTicket, NewUser, RoomRow,
    StorageRow, Store, StoreError, StoreResult, TicketRow, UserRow,
};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return StoreError::NotFound;
        }
        if let Some(db) = err.as_database_error() {
            match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return StoreError::UniqueViolation(
                        db.constraint().unwrap_or("row").to_string(),
                    );
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return StoreError::ForeignKeyViolation(
                        db.constraint().unwrap_or("reference").to_string(),
                    );
                }
                _ => {}
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// PostgreSQL-backed store. All SQL lives here; handlers only see the
/// [`Store`] trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let row = sqlx::query_as::<Postgres, UserRow>(
            r#"
            INSERT INTO users (username, password, fullname, email, phone, staff)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, password, fullname, email, phone, staff
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.fullname)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.staff)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<Postgres, UserRow>(
            "SELECT id, username, password, fullname, email, phone, staff FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<Postgres, UserRow>(
            "SELECT id, username, password, fullname, email, phone, staff FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn users(&self) -> StoreResult<Vec<UserRow>> {
        Ok(sqlx::query_as::<Postgres, UserRow>(
            "SELECT id, username, password, fullname, email, phone, staff FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_user(&self, user: UserRow) -> StoreResult<UserRow> {
        sqlx::query_as::<Postgres, UserRow>(
            r#"
            UPDATE users
            SET username = $1, password = $2, fullname = $3, email = $4, phone = $5, staff = $6
            WHERE id = $7
            RETURNING id, username, password, fullname, email, phone, staff
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.fullname)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.staff)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_room(&self, room: i64) -> StoreResult<RoomRow> {
        Ok(sqlx::query_as::<Postgres, RoomRow>(
            "INSERT INTO rooms (room) VALUES ($1) RETURNING room",
        )
        .bind(room)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn rooms(&self) -> StoreResult<Vec<RoomRow>> {
        Ok(
            sqlx::query_as::<Postgres, RoomRow>("SELECT room FROM rooms ORDER BY room")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn rename_room(&self, old_room: i64, new_room: i64) -> StoreResult<RoomRow> {
        sqlx::query_as::<Postgres, RoomRow>(
            "UPDATE rooms SET room = $2 WHERE room = $1 RETURNING room",
        )
        .bind(old_room)
        .bind(new_room)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_room(&self, room: i64) -> StoreResult<()> {
        let res = sqlx::query("DELETE FROM rooms WHERE room = $1")
            .bind(room)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_category(&self, name: &str) -> StoreResult<CategoryRow> {
        Ok(sqlx::query_as::<Postgres, CategoryRow>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn category_by_id(&self, id: i64) -> StoreResult<Option<CategoryRow>> {
        Ok(sqlx::query_as::<Postgres, CategoryRow>(
            "SELECT id, name FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn categories(&self) -> StoreResult<Vec<CategoryRow>> {
        Ok(sqlx::query_as::<Postgres, CategoryRow>(
            "SELECT id, name FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_category(&self, category: CategoryRow) -> StoreResult<CategoryRow> {
        sqlx::query_as::<Postgres, CategoryRow>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&category.name)
        .bind(category.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_category(&self, id: i64) -> StoreResult<()> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_storage(&self, room_id: i64, shelf: &str) -> StoreResult<StorageRow> {
        Ok(sqlx::query_as::<Postgres, StorageRow>(
            "INSERT INTO storages (room_id, shelf) VALUES ($1, $2) RETURNING id, room_id, shelf",
        )
        .bind(room_id)
        .bind(shelf)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn storage_by_id(&self, id: i64) -> StoreResult<Option<StorageRow>> {
        Ok(sqlx::query_as::<Postgres, StorageRow>(
            "SELECT id, room_id, shelf FROM storages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn storages(&self) -> StoreResult<Vec<StorageRow>> {
        Ok(sqlx::query_as::<Postgres, StorageRow>(
            "SELECT id, room_id, shelf FROM storages ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_storage(&self, storage: StorageRow) -> StoreResult<StorageRow> {
        sqlx::query_as::<Postgres, StorageRow>(
            "UPDATE storages SET room_id = $1, shelf = $2 WHERE id = $3 RETURNING id, room_id, shelf",
        )
        .bind(storage.room_id)
        .bind(&storage.shelf)
        .bind(storage.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_storage(&self, id: i64) -> StoreResult<()> {
        let res = sqlx::query("DELETE FROM storages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_exhibit(&self, exhibit: NewExhibit) -> StoreResult<ExhibitRow> {
        Ok(sqlx::query_as::<Postgres, ExhibitRow>(
            r#"
            INSERT INTO exhibits (name, description, date_of_creation, author, material, category_id, storage_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, date_of_creation, author, material, category_id, storage_id
            "#,
        )
        .bind(&exhibit.name)
        .bind(&exhibit.description)
        .bind(exhibit.date_of_creation)
        .bind(&exhibit.author)
        .bind(&exhibit.material)
        .bind(exhibit.category_id)
        .bind(exhibit.storage_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn exhibit_by_id(&self, id: i64) -> StoreResult<Option<ExhibitRow>> {
        Ok(sqlx::query_as::<Postgres, ExhibitRow>(
            r#"
            SELECT id, name, description, date_of_creation, author, material, category_id, storage_id
            FROM exhibits WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn exhibits(&self) -> StoreResult<Vec<ExhibitRow>> {
        Ok(sqlx::query_as::<Postgres, ExhibitRow>(
            r#"
            SELECT id, name, description, date_of_creation, author, material, category_id, storage_id
            FROM exhibits ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_exhibit_composite(
        &self,
        exhibit: ExhibitRow,
        category: CategoryRow,
        storage: StorageRow,
    ) -> StoreResult<ExhibitRow> {
        // One transaction for all three rows; a failure on any statement
        // rolls the whole composite back.
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE categories SET name = $1 WHERE id = $2")
            .bind(&category.name)
            .bind(category.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE storages SET room_id = $1, shelf = $2 WHERE id = $3")
            .bind(storage.room_id)
            .bind(&storage.shelf)
            .bind(storage.id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<Postgres, ExhibitRow>(
            r#"
            UPDATE exhibits
            SET name = $1, description = $2, date_of_creation = $3, author = $4,
                material = $5, category_id = $6, storage_id = $7
            WHERE id = $8
            RETURNING id, name, description, date_of_creation, author, material, category_id, storage_id
            "#,
        )
        .bind(&exhibit.name)
        .bind(&exhibit.description)
        .bind(exhibit.date_of_creation)
        .bind(&exhibit.author)
        .bind(&exhibit.material)
        .bind(exhibit.category_id)
        .bind(exhibit.storage_id)
        .bind(exhibit.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        tx.commit().await?;
        Ok(row)
    }

    async fn delete_exhibit(&self, id: i64) -> StoreResult<()> {
        let res = sqlx::query("DELETE FROM exhibits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_activity(&self, activity: NewActivity) -> StoreResult<ActivityRow> {
        Ok(sqlx::query_as::<Postgres, ActivityRow>(
            r#"
            INSERT INTO activities (name, description, date, room_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, date, room_id
            "#,
        )
        .bind(&activity.name)
        .bind(&activity.description)
        .bind(activity.date)
        .bind(activity.room_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn activity_by_id(&self, id: i64) -> StoreResult<Option<ActivityRow>> {
        Ok(sqlx::query_as::<Postgres, ActivityRow>(
            "SELECT id, name, description, date, room_id FROM activities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn activities(&self) -> StoreResult<Vec<ActivityRow>> {
        Ok(sqlx::query_as::<Postgres, ActivityRow>(
            "SELECT id, name, description, date, room_id FROM activities ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_activity(&self, activity: ActivityRow) -> StoreResult<ActivityRow> {
        sqlx::query_as::<Postgres, ActivityRow>(
            r#"
            UPDATE activities SET name = $1, description = $2, date = $3, room_id = $4
            WHERE id = $5
            RETURNING id, name, description, date, room_id
            "#,
        )
        .bind(&activity.name)
        .bind(&activity.description)
        .bind(activity.date)
        .bind(activity.room_id)
        .bind(activity.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_activity(&self, id: i64) -> StoreResult<()> {
        let res = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_ticket(&self, ticket: NewTicket) -> StoreResult<TicketRow> {
        // Random identifier keeps ticket ids unguessable.
        Ok(sqlx::query_as::<Postgres, TicketRow>(
            r#"
            INSERT INTO tickets (id, user_id, activity_id, cost, visited)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING id, user_id, activity_id, cost, date, visited
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ticket.user_id)
        .bind(ticket.activity_id)
        .bind(ticket.cost)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn ticket_by_id(&self, id: Uuid) -> StoreResult<Option<TicketRow>> {
        Ok(sqlx::query_as::<Postgres, TicketRow>(
            "SELECT id, user_id, activity_id, cost, date, visited FROM tickets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn tickets(&self) -> StoreResult<Vec<TicketRow>> {
        Ok(sqlx::query_as::<Postgres, TicketRow>(
            "SELECT id, user_id, activity_id, cost, date, visited FROM tickets ORDER BY date",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_ticket(&self, ticket: TicketRow) -> StoreResult<TicketRow> {
        sqlx::query_as::<Postgres, TicketRow>(
            r#"
            UPDATE tickets SET user_id = $1, activity_id = $2, cost = $3, date = $4, visited = $5
            WHERE id = $6
            RETURNING id, user_id, activity_id, cost, date, visited
            "#,
        )
        .bind(ticket.user_id)
        .bind(ticket.activity_id)
        .bind(ticket.cost)
        .bind(ticket.date)
        .bind(ticket.visited)
        .bind(ticket.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_ticket(&self, id: Uuid) -> StoreResult<()> {
        let res = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
