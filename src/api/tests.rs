use std::sync::Arc;

use poem::http::StatusCode;
use poem::test::TestClient;
use poem::Route;
use serde_json::{json, Value};

use crate::api::build_app;
use crate::utils::config::{Config, FeatureFlags};
use crate::utils::message_store::MessageStore;

fn app_with(features: FeatureFlags) -> Route {
    let config = Config { features, ..Config::default() };
    build_app(&config, Arc::new(MessageStore::new()))
}

fn default_client() -> TestClient<Route> {
    TestClient::new(app_with(FeatureFlags::default()))
}

// ---------------------------------------------------------------------------
// Greetings
// ---------------------------------------------------------------------------
#[tokio::test]
async fn hello_default() {
    let cli = default_client();
    let resp = cli.get("/hello").send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"message": "Hello Kraken"})).await;
}

#[tokio::test]
async fn hello_with_name() {
    let cli = default_client();
    let resp = cli.get("/hello").query("name", &"Alice").send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"message": "Hello Alice"})).await;
}

#[tokio::test]
async fn hello_formal_param() {
    let cli = default_client();
    let resp = cli.get("/hello").query("formal", &true).send().await;
    resp.assert_status_is_ok();
    let body: Value = resp.0.into_body().into_json().await.unwrap();
    assert!(body["message"].as_str().unwrap().starts_with("Good day"));
}

#[tokio::test]
async fn hello_formal_accepts_common_spellings() {
    let cli = default_client();
    for raw in ["True", "1", "yes", "ON"] {
        let resp = cli.get("/hello").query("formal", &raw).send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "Good day Kraken"})).await;
    }
    for raw in ["False", "0", "no"] {
        let resp = cli.get("/hello").query("formal", &raw).send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "Hello Kraken"})).await;
    }
}

#[tokio::test]
async fn hello_bad_formal_is_json_bad_request() {
    let cli = default_client();
    let resp = cli.get("/hello").query("formal", &"maybe").send().await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.0.into_body().into_json().await.unwrap();
    assert_eq!(body["result_code"], "400");
    assert!(body["result_msg"].as_str().unwrap().contains("formal"));
}

#[tokio::test]
async fn hello_formal_by_default() {
    let cli = TestClient::new(app_with(FeatureFlags { goodbye_enabled: true, formal_greeting_default: true }));
    let resp = cli.get("/hello").query("name", &"Alice").send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"message": "Good day Alice"})).await;
}

#[tokio::test]
async fn goodbye_default_and_named() {
    let cli = default_client();
    let resp = cli.get("/goodbye").send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"message": "Goodbye world"})).await;

    let resp = cli.get("/goodbye").query("name", &"Alice").send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"message": "Goodbye Alice"})).await;
}

#[tokio::test]
async fn goodbye_absent_when_disabled() {
    let cli = TestClient::new(app_with(FeatureFlags { goodbye_enabled: false, formal_greeting_default: false }));
    cli.get("/goodbye").send().await.assert_status(StatusCode::NOT_FOUND);

    // Everything else is still served.
    cli.get("/hello").send().await.assert_status_is_ok();
    cli.get("/messages").send().await.assert_status_is_ok();
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------
#[tokio::test]
async fn list_messages_empty() {
    let cli = default_client();
    let resp = cli.get("/messages").send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!([])).await;
}

#[tokio::test]
async fn create_and_get_message() {
    let cli = default_client();
    let resp = cli.post("/messages").body_json(&json!({"content": "Hello world!"})).send().await;
    resp.assert_status(StatusCode::CREATED);
    resp.assert_json(json!({"id": 1, "content": "Hello world!"})).await;

    let resp = cli.get("/messages/1").send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"id": 1, "content": "Hello world!"})).await;
}

#[tokio::test]
async fn create_ignores_client_id() {
    let cli = default_client();
    let resp = cli.post("/messages").body_json(&json!({"id": 77, "content": "mine"})).send().await;
    resp.assert_status(StatusCode::CREATED);
    resp.assert_json(json!({"id": 1, "content": "mine"})).await;

    cli.get("/messages/77").send().await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_without_content_is_rejected() {
    let cli = default_client();
    let resp = cli.post("/messages").body_json(&json!({"text": "wrong field"})).send().await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    // Nothing was stored and no id was consumed.
    cli.get("/messages").send().await.assert_json(json!([])).await;
    let resp = cli.post("/messages").body_json(&json!({"content": "first"})).send().await;
    resp.assert_json(json!({"id": 1, "content": "first"})).await;
}

#[tokio::test]
async fn list_messages_in_creation_order() {
    let cli = default_client();
    for content in ["one", "two", "three"] {
        cli.post("/messages").body_json(&json!({"content": content})).send().await
            .assert_status(StatusCode::CREATED);
    }
    cli.delete("/messages/2").send().await.assert_status(StatusCode::NO_CONTENT);

    let resp = cli.get("/messages").send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!([
        {"id": 1, "content": "one"},
        {"id": 3, "content": "three"},
    ])).await;
}

#[tokio::test]
async fn update_message_with_put() {
    let cli = default_client();
    cli.post("/messages").body_json(&json!({"content": "Original"})).send().await
        .assert_status(StatusCode::CREATED);

    let resp = cli.put("/messages/1").body_json(&json!({"content": "Updated complete message"})).send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"id": 1, "content": "Updated complete message"})).await;

    let resp = cli.get("/messages/1").send().await;
    resp.assert_json(json!({"id": 1, "content": "Updated complete message"})).await;
}

#[tokio::test]
async fn put_keeps_path_id() {
    let cli = default_client();
    cli.post("/messages").body_json(&json!({"content": "Original"})).send().await
        .assert_status(StatusCode::CREATED);

    let resp = cli.put("/messages/1").body_json(&json!({"id": 5, "content": "moved?"})).send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"id": 1, "content": "moved?"})).await;
}

#[tokio::test]
async fn put_missing_message() {
    let cli = default_client();
    let resp = cli.put("/messages/9").body_json(&json!({"content": "nobody home"})).send().await;
    resp.assert_status(StatusCode::NOT_FOUND);
    resp.assert_json(json!({"result_code": "404", "result_msg": "Message 9 not found"})).await;
}

#[tokio::test]
async fn partially_update_message_with_patch() {
    let cli = default_client();
    cli.post("/messages").body_json(&json!({"content": "Initial content"})).send().await
        .assert_status(StatusCode::CREATED);

    let resp = cli.patch("/messages/1")
        .body_json(&json!({"content": "Partially updated message", "mood": "cheerful"}))
        .send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"id": 1, "content": "Partially updated message"})).await;
}

#[tokio::test]
async fn patch_cannot_change_id() {
    let cli = default_client();
    cli.post("/messages").body_json(&json!({"content": "Initial content"})).send().await
        .assert_status(StatusCode::CREATED);

    let resp = cli.patch("/messages/1").body_json(&json!({"id": 2, "content": "sneaky"})).send().await;
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let resp = cli.get("/messages/1").send().await;
    resp.assert_json(json!({"id": 1, "content": "Initial content"})).await;
}

#[tokio::test]
async fn patch_accepts_same_id_written_as_float() {
    let cli = default_client();
    cli.post("/messages").body_json(&json!({"content": "Initial content"})).send().await
        .assert_status(StatusCode::CREATED);

    let resp = cli.patch("/messages/1").body_json(&json!({"id": 1.0, "content": "same id"})).send().await;
    resp.assert_status_is_ok();
    resp.assert_json(json!({"id": 1, "content": "same id"})).await;
}

#[tokio::test]
async fn patch_with_non_object_body() {
    let cli = default_client();
    cli.post("/messages").body_json(&json!({"content": "Initial content"})).send().await
        .assert_status(StatusCode::CREATED);

    let resp = cli.patch("/messages/1").body_json(&json!(["content", "x"])).send().await;
    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn patch_missing_message() {
    let cli = default_client();
    let resp = cli.patch("/messages/4").body_json(&json!({"content": "x"})).send().await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_message() {
    let cli = default_client();
    cli.post("/messages").body_json(&json!({"content": "To be deleted"})).send().await
        .assert_status(StatusCode::CREATED);

    let resp = cli.delete("/messages/1").send().await;
    resp.assert_status(StatusCode::NO_CONTENT);
    resp.assert_text("").await;

    cli.get("/messages/1").send().await.assert_status(StatusCode::NOT_FOUND);
    cli.delete("/messages/1").send().await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_ids_are_bad_requests() {
    let cli = default_client();
    cli.get("/messages/abc").send().await.assert_status(StatusCode::BAD_REQUEST);
    cli.get("/messages/0").send().await.assert_status(StatusCode::BAD_REQUEST);
    cli.delete("/messages/-3").send().await.assert_status(StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Documentation
// ---------------------------------------------------------------------------
#[tokio::test]
async fn openapi_document_lists_routes() {
    let cli = TestClient::new(app_with(FeatureFlags { goodbye_enabled: false, formal_greeting_default: false }));
    let resp = cli.get("/openapi.json").send().await;
    resp.assert_status_is_ok();

    let spec: Value = resp.0.into_body().into_json().await.unwrap();
    let paths = spec["paths"].as_object().unwrap();
    assert!(paths.contains_key("/hello"));
    assert!(paths.contains_key("/messages"));
    assert!(paths.contains_key("/messages/{id}"));
    assert!(!paths.contains_key("/goodbye"));
}
