use serde::Deserialize;

use crate::error::ApiError;
use crate::validate::positive;

#[derive(Debug, Deserialize)]
pub struct RoomRequest {
    pub room: i64,
}

impl RoomRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive("room", self.room)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoomRequest {
    pub old_room: i64,
    pub new_room: i64,
}

impl UpdateRoomRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        positive("old_room", self.old_room)?;
        positive("new_room", self.new_room)
    }
}

#[derive(Debug, Deserialize)]
pub struct RoomDeleteQuery {
    pub number: i64,
}
