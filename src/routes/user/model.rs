use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::UserRow;
use crate::validate::{max_len, non_empty, opt_max_len};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub fullname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub staff: bool,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_empty("username", &self.username)?;
        max_len("username", &self.username, 60)?;
        non_empty("fullname", &self.fullname)?;
        max_len("fullname", &self.fullname, 256)?;
        opt_max_len("email", self.email.as_deref(), 60)?;
        opt_max_len("phone", self.phone.as_deref(), 60)?;
        Ok(())
    }
}

/// Full-row update; the password is supplied in plaintext and re-hashed.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub fullname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub staff: bool,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        non_empty("username", &self.username)?;
        max_len("username", &self.username, 60)?;
        non_empty("fullname", &self.fullname)?;
        max_len("fullname", &self.fullname, 256)?;
        opt_max_len("email", self.email.as_deref(), 60)?;
        opt_max_len("phone", self.phone.as_deref(), 60)?;
        Ok(())
    }
}

/// Public projection of a user row; the password hash never leaves the
/// server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub fullname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub staff: bool,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            fullname: row.fullname,
            email: row.email,
            phone: row.phone,
            staff: row.staff,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub id: Option<i64>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserDeleteQuery {
    pub id: i64,
}
