use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use museum_backend::{AppState, config::Config, router, store::MemStore};

fn app() -> Router {
    let config = Config {
        database_url: None,
        token_key: "integration-test-key".into(),
        token_ttl_secs: 30 * 60,
        server_host: "127.0.0.1".into(),
        server_port: 0,
    };
    router::build(AppState {
        store: Arc::new(MemStore::new()),
        config,
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

/// Seeds a room, a storage shelf and a category; returns (storage_id,
/// category_id).
async fn seed_inventory(app: &Router) -> (i64, i64) {
    let (status, body) = post(app, "/api/v1/rooms", json!({"room": 101})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"room": 101}));

    let (status, storage) = post(
        app,
        "/api/v1/storage",
        json!({"room_id": 101, "shelf": "A1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(storage["room_id"], 101);
    assert_eq!(storage["shelf"], "A1");

    let (status, category) = post(app, "/api/v1/categories", json!({"name": "Pottery"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(category["name"], "Pottery");

    (
        storage["id"].as_i64().unwrap(),
        category["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn exhibit_create_returns_nested_category_and_storage() {
    let app = app();
    let (storage_id, category_id) = seed_inventory(&app).await;

    let (status, exhibit) = post(
        &app,
        "/api/v1/exhibits",
        json!({
            "name": "Vase",
            "description": "Ming dynasty vase",
            "category_id": category_id,
            "storage_id": storage_id,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exhibit["name"], "Vase");
    // composite response carries full objects, not bare ids
    assert_eq!(exhibit["category"]["id"], category_id);
    assert_eq!(exhibit["category"]["name"], "Pottery");
    assert_eq!(exhibit["storage"]["id"], storage_id);
    assert_eq!(exhibit["storage"]["shelf"], "A1");

    let id = exhibit["id"].as_i64().unwrap();
    let (status, fetched) = get(&app, &format!("/api/v1/exhibits?id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["category"]["name"], "Pottery");
    assert_eq!(fetched["storage"]["shelf"], "A1");
}

#[tokio::test]
async fn exhibit_with_unknown_category_is_not_found() {
    let app = app();
    let (storage_id, _) = seed_inventory(&app).await;

    let (status, body) = post(
        &app,
        "/api/v1/exhibits",
        json!({
            "name": "Vase",
            "description": "no such category",
            "category_id": 9999,
            "storage_id": storage_id,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn deleted_storage_shows_as_null_in_composite_read() {
    let app = app();
    let (storage_id, category_id) = seed_inventory(&app).await;

    let (_, exhibit) = post(
        &app,
        "/api/v1/exhibits",
        json!({
            "name": "Amphora",
            "description": "Greek amphora",
            "category_id": category_id,
            "storage_id": storage_id,
        }),
    )
    .await;
    let id = exhibit["id"].as_i64().unwrap();

    let (status, body) =
        send(&app, Method::DELETE, &format!("/api/v1/storage?id={storage_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": "Ok"}));

    let (status, fetched) = get(&app, &format!("/api/v1/exhibits?id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(fetched["storage"].is_null());
    assert_eq!(fetched["category"]["name"], "Pottery");
}

#[tokio::test]
async fn composite_update_rewrites_sub_entities() {
    let app = app();
    let (storage_id, category_id) = seed_inventory(&app).await;

    let (_, exhibit) = post(
        &app,
        "/api/v1/exhibits",
        json!({
            "name": "Coin",
            "description": "Roman coin",
            "category_id": category_id,
            "storage_id": storage_id,
        }),
    )
    .await;

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/api/v1/exhibits",
        Some(json!({
            "id": exhibit["id"],
            "name": "Denarius",
            "description": "Roman silver coin",
            "date_of_creation": exhibit["date_of_creation"],
            "author": null,
            "material": "silver",
            "category": {"id": category_id, "name": "Numismatics"},
            "storage": {"id": storage_id, "room_id": 101, "shelf": "B2"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Denarius");
    assert_eq!(updated["category"]["name"], "Numismatics");
    assert_eq!(updated["storage"]["shelf"], "B2");

    // sub-entity rows were really rewritten
    let (_, category) = get(&app, &format!("/api/v1/categories?id={category_id}")).await;
    assert_eq!(category["name"], "Numismatics");
}

#[tokio::test]
async fn unknown_exhibit_id_is_not_found() {
    let app = app();
    let (status, body) = get(&app, "/api/v1/exhibits?id=42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn short_password_is_rejected_before_any_write() {
    let app = app();
    let (status, body) = post(
        &app,
        "/api/v1/users",
        json!({"username": "guard", "password": "short", "fullname": "Night Guard"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("password"));

    // nothing was inserted
    let (status, users) = get(&app, "/api/v1/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users, json!([]));
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let app = app();
    let first = json!({"username": "guard", "password": "password123", "fullname": "Night Guard"});
    let (status, created) = post(&app, "/api/v1/users", first).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["username"], "guard");
    // the hash must never appear in a read shape
    assert!(created.get("password").is_none());

    let (status, body) = post(
        &app,
        "/api/v1/users",
        json!({"username": "guard", "password": "password456", "fullname": "Day Guard"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");

    // first row unaffected
    let (status, user) = get(&app, "/api/v1/users?username=guard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["fullname"], "Night Guard");
}

#[tokio::test]
async fn login_then_check_accepts_the_issued_token() {
    let app = app();
    post(
        &app,
        "/api/v1/users",
        json!({"username": "curator", "password": "password123", "fullname": "Cura Tor"}),
    )
    .await;

    let (status, body) = post(
        &app,
        "/api/v1/login",
        json!({"username": "curator", "password": "password123"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["user_token"].as_str().unwrap().to_string();
    assert!(body["user_id"].is_i64());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/check")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // same token without the Bearer scheme must be rejected
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/check")
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn check_without_or_with_garbage_token_is_unauthorized() {
    let app = app();

    let (status, _) = get(&app, "/api/v1/check").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/check")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_password_and_unknown_user_are_indistinguishable() {
    let app = app();
    post(
        &app,
        "/api/v1/users",
        json!({"username": "curator", "password": "password123", "fullname": "Cura Tor"}),
    )
    .await;

    let (wrong_pw_status, wrong_pw_body) = post(
        &app,
        "/api/v1/login",
        json!({"username": "curator", "password": "wrong-password"}),
    )
    .await;
    let (unknown_status, unknown_body) = post(
        &app,
        "/api/v1/login",
        json!({"username": "nobody", "password": "password123"}),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_pw_body, unknown_body);
}

#[tokio::test]
async fn room_rename_and_referenced_delete() {
    let app = app();
    let (status, _) = post(&app, "/api/v1/rooms", json!({"room": 5})).await;
    assert_eq!(status, StatusCode::OK);
    post(&app, "/api/v1/storage", json!({"room_id": 5, "shelf": "C3"})).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/rooms",
        Some(json!({"old_room": 5, "new_room": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"room": 6}));

    // storage still pins the room down
    let (status, body) = send(&app, Method::DELETE, "/api/v1/rooms?number=6", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_positive_room_number_is_rejected() {
    let app = app();
    let (status, body) = post(&app, "/api/v1/rooms", json!({"room": 0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("room"));
}

#[tokio::test]
async fn tickets_get_random_identifiers() {
    let app = app();
    post(&app, "/api/v1/rooms", json!({"room": 1})).await;
    let (_, user) = post(
        &app,
        "/api/v1/users",
        json!({"username": "visitor", "password": "password123", "fullname": "Visi Tor"}),
    )
    .await;
    let (_, activity) = post(
        &app,
        "/api/v1/activity",
        json!({"name": "Night tour", "description": "After-hours tour", "room_id": 1}),
    )
    .await;

    let (status, ticket) = post(
        &app,
        "/api/v1/tickets",
        json!({
            "user_id": user["id"],
            "activity_id": activity["id"],
            "cost": 12.5,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["visited"], json!(false));
    assert_eq!(ticket["cost"], json!(12.5));
    // opaque uuid, not a sequential integer
    let id = ticket["id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());

    let (status, fetched) = get(&app, &format!("/api/v1/tickets?id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], ticket["id"]);
}

#[tokio::test]
async fn exhibit_name_is_capped_at_60_characters() {
    let app = app();
    let (storage_id, category_id) = seed_inventory(&app).await;

    let (status, body) = post(
        &app,
        "/api/v1/exhibits",
        json!({
            "name": "x".repeat(61),
            "description": "too long",
            "category_id": category_id,
            "storage_id": storage_id,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));

    // 256 is fine for a category name, the cap is specific to exhibits
    let (status, _) = post(&app, "/api/v1/categories", json!({"name": "y".repeat(256)})).await;
    assert_eq!(status, StatusCode::OK);
}
