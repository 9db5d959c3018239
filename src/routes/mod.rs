use serde::Serialize;

pub mod activity;
pub mod auth;
pub mod category;
pub mod exhibit;
pub mod room;
pub mod storage;
pub mod ticket;
pub mod user;

/// Body returned by every successful delete (and by `/check`).
#[derive(Debug, Serialize)]
pub struct OkBody {
    pub ok: &'static str,
}

impl OkBody {
    pub fn new() -> Self {
        Self { ok: "Ok" }
    }
}

impl Default for OkBody {
    fn default() -> Self {
        Self::new()
    }
}
