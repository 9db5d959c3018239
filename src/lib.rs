use std::sync::Arc;

use config::Config;
use store::Store;

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod store;
pub mod utils;
pub mod validate;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
}
