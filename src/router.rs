use axum::{
    Router,
    routing::{get, post},
};

use crate::{AppState, routes};

/// Builds the full `/api/v1` surface. Shared between `main` and the
/// integration tests so both exercise the same routing table.
pub fn build(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/users",
            post(routes::user::create)
                .get(routes::user::fetch)
                .put(routes::user::update)
                .delete(routes::user::remove),
        )
        .route(
            "/rooms",
            post(routes::room::create)
                .get(routes::room::fetch)
                .put(routes::room::update)
                .delete(routes::room::remove),
        )
        .route(
            "/categories",
            post(routes::category::create)
                .get(routes::category::fetch)
                .put(routes::category::update)
                .delete(routes::category::remove),
        )
        .route(
            "/storage",
            post(routes::storage::create)
                .get(routes::storage::fetch)
                .put(routes::storage::update)
                .delete(routes::storage::remove),
        )
        .route(
            "/exhibits",
            post(routes::exhibit::create)
                .get(routes::exhibit::fetch)
                .put(routes::exhibit::update)
                .delete(routes::exhibit::remove),
        )
        .route(
            "/activity",
            post(routes::activity::create)
                .get(routes::activity::fetch)
                .put(routes::activity::update)
                .delete(routes::activity::remove),
        )
        .route(
            "/tickets",
            post(routes::ticket::create)
                .get(routes::ticket::fetch)
                .put(routes::ticket::update)
                .delete(routes::ticket::remove),
        )
        .route("/login", post(routes::auth::login))
        .route("/check", get(routes::auth::check));

    Router::new().nest("/api/v1", api).with_state(state)
}
