use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    ActivityRow, CategoryRow, ExhibitRow, NewActivity, NewExhibit, NewTicket, NewUser, RoomRow,
    StorageRow, Store, StoreError, StoreResult, TicketRow, UserRow,
};

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, UserRow>,
    rooms: Vec<i64>,
    storages: BTreeMap<i64, StorageRow>,
    categories: BTreeMap<i64, CategoryRow>,
    exhibits: BTreeMap<i64, ExhibitRow>,
    activities: BTreeMap<i64, ActivityRow>,
    tickets: BTreeMap<Uuid, TicketRow>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store with the same referential-integrity semantics as the
/// Postgres schema: unique usernames and category names, restrict on room,
/// user and activity deletion, SET NULL on category/storage deletion, room
/// renames cascading to referencing rows. Backs the integration tests and
/// database-less runs.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".into()))
    }
}

#[async_trait]
impl Store for MemStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let mut inner = self.lock()?;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation("username".into()));
        }
        if let Some(email) = &user.email {
            if inner.users.values().any(|u| u.email.as_ref() == Some(email)) {
                return Err(StoreError::UniqueViolation("email".into()));
            }
        }
        if let Some(phone) = &user.phone {
            if inner.users.values().any(|u| u.phone.as_ref() == Some(phone)) {
                return Err(StoreError::UniqueViolation("phone".into()));
            }
        }
        let id = inner.next_id();
        let row = UserRow {
            id,
            username: user.username,
            password: user.password_hash,
            fullname: user.fullname,
            email: user.email,
            phone: user.phone,
            staff: user.staff,
        };
        inner.users.insert(id, row.clone());
        Ok(row)
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<UserRow>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn users(&self) -> StoreResult<Vec<UserRow>> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    async fn update_user(&self, user: UserRow) -> StoreResult<UserRow> {
        let mut inner = self.lock()?;
        if !inner.users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        if inner
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(StoreError::UniqueViolation("username".into()));
        }
        if let Some(email) = &user.email {
            if inner
                .users
                .values()
                .any(|u| u.id != user.id && u.email.as_ref() == Some(email))
            {
                return Err(StoreError::UniqueViolation("email".into()));
            }
        }
        if let Some(phone) = &user.phone {
            if inner
                .users
                .values()
                .any(|u| u.id != user.id && u.phone.as_ref() == Some(phone))
            {
                return Err(StoreError::UniqueViolation("phone".into()));
            }
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if inner.tickets.values().any(|t| t.user_id == id) {
            return Err(StoreError::ForeignKeyViolation("tickets.user_id".into()));
        }
        inner.users.remove(&id).ok_or(StoreError::NotFound)?;
        Ok(())
    }

    async fn create_room(&self, room: i64) -> StoreResult<RoomRow> {
        let mut inner = self.lock()?;
        if inner.rooms.contains(&room) {
            return Err(StoreError::UniqueViolation("room".into()));
        }
        inner.rooms.push(room);
        inner.rooms.sort_unstable();
        Ok(RoomRow { room })
    }

    async fn rooms(&self) -> StoreResult<Vec<RoomRow>> {
        Ok(self.lock()?.rooms.iter().map(|&room| RoomRow { room }).collect())
    }

    async fn rename_room(&self, old_room: i64, new_room: i64) -> StoreResult<RoomRow> {
        let mut inner = self.lock()?;
        if !inner.rooms.contains(&old_room) {
            return Err(StoreError::NotFound);
        }
        if old_room != new_room && inner.rooms.contains(&new_room) {
            return Err(StoreError::UniqueViolation("room".into()));
        }
        inner.rooms.retain(|&r| r != old_room);
        inner.rooms.push(new_room);
        inner.rooms.sort_unstable();
        // ON UPDATE CASCADE
        for storage in inner.storages.values_mut() {
            if storage.room_id == old_room {
                storage.room_id = new_room;
            }
        }
        for activity in inner.activities.values_mut() {
            if activity.room_id == old_room {
                activity.room_id = new_room;
            }
        }
        Ok(RoomRow { room: new_room })
    }

    async fn delete_room(&self, room: i64) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if !inner.rooms.contains(&room) {
            return Err(StoreError::NotFound);
        }
        if inner.storages.values().any(|s| s.room_id == room) {
            return Err(StoreError::ForeignKeyViolation("storages.room_id".into()));
        }
        if inner.activities.values().any(|a| a.room_id == room) {
            return Err(StoreError::ForeignKeyViolation("activities.room_id".into()));
        }
        inner.rooms.retain(|&r| r != room);
        Ok(())
    }

    async fn create_category(&self, name: &str) -> StoreResult<CategoryRow> {
        let mut inner = self.lock()?;
        if inner.categories.values().any(|c| c.name == name) {
            return Err(StoreError::UniqueViolation("category name".into()));
        }
        let id = inner.next_id();
        let row = CategoryRow {
            id,
            name: name.to_string(),
        };
        inner.categories.insert(id, row.clone());
        Ok(row)
    }

    async fn category_by_id(&self, id: i64) -> StoreResult<Option<CategoryRow>> {
        Ok(self.lock()?.categories.get(&id).cloned())
    }

    async fn categories(&self) -> StoreResult<Vec<CategoryRow>> {
        Ok(self.lock()?.categories.values().cloned().collect())
    }

    async fn update_category(&self, category: CategoryRow) -> StoreResult<CategoryRow> {
        let mut inner = self.lock()?;
        if !inner.categories.contains_key(&category.id) {
            return Err(StoreError::NotFound);
        }
        if inner
            .categories
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(StoreError::UniqueViolation("category name".into()));
        }
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.categories.remove(&id).ok_or(StoreError::NotFound)?;
        // ON DELETE SET NULL
        for exhibit in inner.exhibits.values_mut() {
            if exhibit.category_id == Some(id) {
                exhibit.category_id = None;
            }
        }
        Ok(())
    }

    async fn create_storage(&self, room_id: i64, shelf: &str) -> StoreResult<StorageRow> {
        let mut inner = self.lock()?;
        if !inner.rooms.contains(&room_id) {
            return Err(StoreError::ForeignKeyViolation("storages.room_id".into()));
        }
        let id = inner.next_id();
        let row = StorageRow {
            id,
            room_id,
            shelf: shelf.to_string(),
        };
        inner.storages.insert(id, row.clone());
        Ok(row)
    }

    async fn storage_by_id(&self, id: i64) -> StoreResult<Option<StorageRow>> {
        Ok(self.lock()?.storages.get(&id).cloned())
    }

    async fn storages(&self) -> StoreResult<Vec<StorageRow>> {
        Ok(self.lock()?.storages.values().cloned().collect())
    }

    async fn update_storage(&self, storage: StorageRow) -> StoreResult<StorageRow> {
        let mut inner = self.lock()?;
        if !inner.storages.contains_key(&storage.id) {
            return Err(StoreError::NotFound);
        }
        if !inner.rooms.contains(&storage.room_id) {
            return Err(StoreError::ForeignKeyViolation("storages.room_id".into()));
        }
        inner.storages.insert(storage.id, storage.clone());
        Ok(storage)
    }

    async fn delete_storage(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.storages.remove(&id).ok_or(StoreError::NotFound)?;
        for exhibit in inner.exhibits.values_mut() {
            if exhibit.storage_id == Some(id) {
                exhibit.storage_id = None;
            }
        }
        Ok(())
    }

    async fn create_exhibit(&self, exhibit: NewExhibit) -> StoreResult<ExhibitRow> {
        let mut inner = self.lock()?;
        if !inner.categories.contains_key(&exhibit.category_id) {
            return Err(StoreError::ForeignKeyViolation(
                "exhibits.category_id".into(),
            ));
        }
        if !inner.storages.contains_key(&exhibit.storage_id) {
            return Err(StoreError::ForeignKeyViolation("exhibits.storage_id".into()));
        }
        let id = inner.next_id();
        let row = ExhibitRow {
            id,
            name: exhibit.name,
            description: exhibit.description,
            date_of_creation: exhibit.date_of_creation,
            author: exhibit.author,
            material: exhibit.material,
            category_id: Some(exhibit.category_id),
            storage_id: Some(exhibit.storage_id),
        };
        inner.exhibits.insert(id, row.clone());
        Ok(row)
    }

    async fn exhibit_by_id(&self, id: i64) -> StoreResult<Option<ExhibitRow>> {
        Ok(self.lock()?.exhibits.get(&id).cloned())
    }

    async fn exhibits(&self) -> StoreResult<Vec<ExhibitRow>> {
        Ok(self.lock()?.exhibits.values().cloned().collect())
    }

    async fn update_exhibit_composite(
        &self,
        exhibit: ExhibitRow,
        category: CategoryRow,
        storage: StorageRow,
    ) -> StoreResult<ExhibitRow> {
        let mut inner = self.lock()?;
        // Validate everything before mutating anything, so the composite
        // update stays all-or-nothing under the single lock.
        if !inner.exhibits.contains_key(&exhibit.id) {
            return Err(StoreError::NotFound);
        }
        if !inner.categories.contains_key(&category.id)
            || !inner.storages.contains_key(&storage.id)
        {
            return Err(StoreError::NotFound);
        }
        if let Some(category_id) = exhibit.category_id {
            if !inner.categories.contains_key(&category_id) {
                return Err(StoreError::ForeignKeyViolation(
                    "exhibits.category_id".into(),
                ));
            }
        }
        if let Some(storage_id) = exhibit.storage_id {
            if !inner.storages.contains_key(&storage_id) {
                return Err(StoreError::ForeignKeyViolation("exhibits.storage_id".into()));
            }
        }
        if !inner.rooms.contains(&storage.room_id) {
            return Err(StoreError::ForeignKeyViolation("storages.room_id".into()));
        }
        if inner
            .categories
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(StoreError::UniqueViolation("category name".into()));
        }
        inner.categories.insert(category.id, category);
        inner.storages.insert(storage.id, storage);
        inner.exhibits.insert(exhibit.id, exhibit.clone());
        Ok(exhibit)
    }

    async fn delete_exhibit(&self, id: i64) -> StoreResult<()> {
        self.lock()?
            .exhibits
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn create_activity(&self, activity: NewActivity) -> StoreResult<ActivityRow> {
        let mut inner = self.lock()?;
        if !inner.rooms.contains(&activity.room_id) {
            return Err(StoreError::ForeignKeyViolation("activities.room_id".into()));
        }
        let id = inner.next_id();
        let row = ActivityRow {
            id,
            name: activity.name,
            description: activity.description,
            date: activity.date,
            room_id: activity.room_id,
        };
        inner.activities.insert(id, row.clone());
        Ok(row)
    }

    async fn activity_by_id(&self, id: i64) -> StoreResult<Option<ActivityRow>> {
        Ok(self.lock()?.activities.get(&id).cloned())
    }

    async fn activities(&self) -> StoreResult<Vec<ActivityRow>> {
        Ok(self.lock()?.activities.values().cloned().collect())
    }

    async fn update_activity(&self, activity: ActivityRow) -> StoreResult<ActivityRow> {
        let mut inner = self.lock()?;
        if !inner.activities.contains_key(&activity.id) {
            return Err(StoreError::NotFound);
        }
        if !inner.rooms.contains(&activity.room_id) {
            return Err(StoreError::ForeignKeyViolation("activities.room_id".into()));
        }
        inner.activities.insert(activity.id, activity.clone());
        Ok(activity)
    }

    async fn delete_activity(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if inner.tickets.values().any(|t| t.activity_id == id) {
            return Err(StoreError::ForeignKeyViolation(
                "tickets.activity_id".into(),
            ));
        }
        inner.activities.remove(&id).ok_or(StoreError::NotFound)?;
        Ok(())
    }

    async fn create_ticket(&self, ticket: NewTicket) -> StoreResult<TicketRow> {
        let mut inner = self.lock()?;
        if !inner.users.contains_key(&ticket.user_id) {
            return Err(StoreError::ForeignKeyViolation("tickets.user_id".into()));
        }
        if !inner.activities.contains_key(&ticket.activity_id) {
            return Err(StoreError::ForeignKeyViolation(
                "tickets.activity_id".into(),
            ));
        }
        let row = TicketRow {
            id: Uuid::new_v4(),
            user_id: ticket.user_id,
            activity_id: ticket.activity_id,
            cost: ticket.cost,
            date: Utc::now(),
            visited: false,
        };
        inner.tickets.insert(row.id, row.clone());
        Ok(row)
    }

    async fn ticket_by_id(&self, id: Uuid) -> StoreResult<Option<TicketRow>> {
        Ok(self.lock()?.tickets.get(&id).cloned())
    }

    async fn tickets(&self) -> StoreResult<Vec<TicketRow>> {
        Ok(self.lock()?.tickets.values().cloned().collect())
    }

    async fn update_ticket(&self, ticket: TicketRow) -> StoreResult<TicketRow> {
        let mut inner = self.lock()?;
        if !inner.tickets.contains_key(&ticket.id) {
            return Err(StoreError::NotFound);
        }
        if !inner.users.contains_key(&ticket.user_id) {
            return Err(StoreError::ForeignKeyViolation("tickets.user_id".into()));
        }
        if !inner.activities.contains_key(&ticket.activity_id) {
            return Err(StoreError::ForeignKeyViolation(
                "tickets.activity_id".into(),
            ));
        }
        inner.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn delete_ticket(&self, id: Uuid) -> StoreResult<()> {
        self.lock()?
            .tickets
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$2b$12$hash".to_string(),
            fullname: "Test User".to_string(),
            email: None,
            phone: None,
            staff: false,
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_a_unique_violation() {
        let store = MemStore::new();
        store.create_user(user("curator")).await.unwrap();
        let err = store.create_user(user("curator")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        // first row untouched
        let existing = store.user_by_username("curator").await.unwrap().unwrap();
        assert_eq!(existing.fullname, "Test User");
    }

    #[tokio::test]
    async fn duplicate_email_and_phone_are_unique_violations() {
        let store = MemStore::new();
        store
            .create_user(NewUser {
                email: Some("front@museum.test".into()),
                phone: Some("555-0100".into()),
                ..user("first")
            })
            .await
            .unwrap();

        let err = store
            .create_user(NewUser {
                phone: Some("555-0100".into()),
                ..user("second")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));

        // updates must not steal another row's email or phone either
        let other = store.create_user(user("third")).await.unwrap();
        let err = store
            .update_user(UserRow {
                email: Some("front@museum.test".into()),
                ..other.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        let err = store
            .update_user(UserRow {
                phone: Some("555-0100".into()),
                ..other.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));

        // keeping your own values on update is fine
        let first = store.user_by_username("first").await.unwrap().unwrap();
        assert!(store.update_user(first).await.is_ok());
    }

    #[tokio::test]
    async fn room_delete_blocker_names_the_referencing_table() {
        let store = MemStore::new();
        store.create_room(8).await.unwrap();
        store
            .create_activity(NewActivity {
                name: "Lecture".into(),
                description: "Evening lecture".into(),
                date: Utc::now(),
                room_id: 8,
            })
            .await
            .unwrap();

        match store.delete_room(8).await.unwrap_err() {
            StoreError::ForeignKeyViolation(what) => assert_eq!(what, "activities.room_id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn storage_requires_an_existing_room() {
        let store = MemStore::new();
        let err = store.create_storage(101, "A1").await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));

        store.create_room(101).await.unwrap();
        let storage = store.create_storage(101, "A1").await.unwrap();
        assert_eq!(storage.room_id, 101);
    }

    #[tokio::test]
    async fn deleting_a_category_nulls_exhibit_references() {
        let store = MemStore::new();
        store.create_room(1).await.unwrap();
        let storage = store.create_storage(1, "B2").await.unwrap();
        let category = store.create_category("Pottery").await.unwrap();
        let exhibit = store
            .create_exhibit(NewExhibit {
                name: "Vase".into(),
                description: "Clay vase".into(),
                date_of_creation: Utc::now(),
                author: None,
                material: Some("clay".into()),
                category_id: category.id,
                storage_id: storage.id,
            })
            .await
            .unwrap();

        store.delete_category(category.id).await.unwrap();

        let row = store.exhibit_by_id(exhibit.id).await.unwrap().unwrap();
        assert_eq!(row.category_id, None);
        assert_eq!(row.storage_id, Some(storage.id));
    }

    #[tokio::test]
    async fn room_rename_cascades_to_referencing_rows() {
        let store = MemStore::new();
        store.create_room(5).await.unwrap();
        let storage = store.create_storage(5, "C3").await.unwrap();

        store.rename_room(5, 6).await.unwrap();

        let row = store.storage_by_id(storage.id).await.unwrap().unwrap();
        assert_eq!(row.room_id, 6);
    }

    #[tokio::test]
    async fn referenced_room_cannot_be_deleted() {
        let store = MemStore::new();
        store.create_room(7).await.unwrap();
        store.create_storage(7, "D4").await.unwrap();
        let err = store.delete_room(7).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn composite_update_rejects_unknown_exhibit_without_side_effects() {
        let store = MemStore::new();
        store.create_room(1).await.unwrap();
        let storage = store.create_storage(1, "A1").await.unwrap();
        let category = store.create_category("Coins").await.unwrap();

        let err = store
            .update_exhibit_composite(
                ExhibitRow {
                    id: 999,
                    name: "Ghost".into(),
                    description: "missing".into(),
                    date_of_creation: Utc::now(),
                    author: None,
                    material: None,
                    category_id: Some(category.id),
                    storage_id: Some(storage.id),
                },
                CategoryRow {
                    id: category.id,
                    name: "Renamed".into(),
                },
                storage.clone(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        // sub-entity update must not have leaked through
        let category = store.category_by_id(category.id).await.unwrap().unwrap();
        assert_eq!(category.name, "Coins");
    }
}
