//! Integration tests for the PasteVault HTTP API.

mod support;

use axum::http::StatusCode;
use pastevault_core::EncryptionKey;
use serde_json::{json, Value};
use std::sync::Arc;
use support::{
    setup_test_server, store_for, test_config_for_db_path, test_server_for_store,
    TEST_MAX_PASTE_SIZE,
};
use tempfile::TempDir;

fn is_paste_id(value: &str) -> bool {
    value.len() == 12
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

#[tokio::test]
async fn test_paste_lifecycle_counts_views() {
    let (server, _temp, _store) = setup_test_server();

    let create_response = server
        .post("/api/paste")
        .json(&json!({
            "content": "print('hi')",
            "language": "python"
        }))
        .await;
    assert_eq!(create_response.status_code(), StatusCode::OK);
    let created: Value = create_response.json();
    let paste_id = created["pasteId"].as_str().expect("pasteId").to_string();
    assert!(is_paste_id(&paste_id), "unexpected id shape: {}", paste_id);

    let first = server.get(&format!("/api/paste/{}", paste_id)).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let first: Value = first.json();
    assert_eq!(first["content"], "print('hi')");
    assert_eq!(first["language"], "python");
    assert_eq!(first["views"], 1);
    assert!(first["createdAt"].is_string());

    let second: Value = server
        .get(&format!("/api/paste/{}", paste_id))
        .await
        .json();
    assert_eq!(second["views"], 2);
    assert_eq!(second["createdAt"], first["createdAt"]);
}

#[tokio::test]
async fn test_missing_or_blank_language_defaults_to_plaintext() {
    let (server, _temp, _store) = setup_test_server();

    for body in [
        json!({ "content": "hello" }),
        json!({ "content": "hello", "language": "   " }),
        json!({ "content": "hello", "language": null }),
    ] {
        let created: Value = server.post("/api/paste").json(&body).await.json();
        let paste_id = created["pasteId"].as_str().expect("pasteId");
        let fetched: Value = server.get(&format!("/api/paste/{}", paste_id)).await.json();
        assert_eq!(fetched["language"], "plaintext");
    }
}

#[tokio::test]
async fn test_create_rejects_invalid_content() {
    let (server, _temp, store) = setup_test_server();

    let oversized = "a".repeat(TEST_MAX_PASTE_SIZE + 1);
    let long_language = "x".repeat(51);
    let cases = [
        json!({ "content": "" }),
        json!({}),
        json!({ "content": oversized }),
        json!({ "content": "ok", "language": long_language }),
    ];

    for body in cases {
        let response = server.post("/api/paste").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert!(error["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }

    assert_eq!(store.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_malformed_bodies_get_json_bad_request() {
    let (server, _temp, store) = setup_test_server();

    let wrong_types = [
        json!({ "content": 123 }),
        json!({ "content": "ok", "language": 5 }),
        json!(["content", "ok"]),
    ];
    for body in wrong_types {
        let response = server.post("/api/paste").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "body: {}", body);
        let error: Value = response.json();
        assert!(error["error"].is_string(), "body: {}", body);
    }

    let untyped = server.post("/api/paste").text("content=hello").await;
    assert_eq!(untyped.status_code(), StatusCode::BAD_REQUEST);
    let error: Value = untyped.json();
    assert!(error["error"].is_string());

    assert_eq!(store.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_content_at_size_limit_is_accepted() {
    let (server, _temp, _store) = setup_test_server();

    let response = server
        .post("/api/paste")
        .json(&json!({ "content": "a".repeat(TEST_MAX_PASTE_SIZE) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let (server, _temp, _store) = setup_test_server();

    let created: Value = server
        .post("/api/paste")
        .json(&json!({ "content": "keep me" }))
        .await
        .json();
    let paste_id = created["pasteId"].as_str().expect("pasteId").to_string();

    for id in ["000000000000", "not-a-paste", "ABCDEF012345"] {
        let response = server.get(&format!("/api/paste/{}", id)).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let error: Value = response.json();
        assert_eq!(error["error"], "Paste not found");
    }

    // Misses leave existing entries untouched.
    let fetched: Value = server.get(&format!("/api/paste/{}", paste_id)).await.json();
    assert_eq!(fetched["views"], 1);
}

#[tokio::test]
async fn test_content_is_encrypted_at_rest() {
    let (server, _temp, store) = setup_test_server();

    let created: Value = server
        .post("/api/paste")
        .json(&json!({ "content": "very secret text" }))
        .await
        .json();
    let paste_id = created["pasteId"].as_str().expect("pasteId");

    let record = store
        .peek(paste_id)
        .await
        .expect("peek")
        .expect("stored row");
    assert_eq!(record.views, 0);
    assert!(!record
        .ciphertext
        .windows(b"very secret".len())
        .any(|window| window == b"very secret"));
}

#[tokio::test]
async fn test_undecryptable_paste_returns_server_error() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_db_path(&temp_dir.path().join("db"));
    let db = Arc::new(pastevault_server::Database::new(&config.db_path).expect("open db"));

    let writer = store_for(&config, db.clone(), &config.encryption_key);
    let paste_id = writer
        .create(b"sealed with another key", None)
        .await
        .expect("create");

    let other_key = EncryptionKey::from_bytes([0x24; 32]);
    let reader = Arc::new(store_for(&config, db, &other_key));
    let server = test_server_for_store(config, reader);

    let response = server.get(&format!("/api/paste/{}", paste_id)).await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: Value = response.json();
    assert_eq!(error["error"], "Failed to retrieve paste");
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let (server, _temp, _store) = setup_test_server();

    let response = server.get("/api/paste/000000000000").await;
    response.assert_header("x-content-type-options", "nosniff");
    response.assert_header("x-frame-options", "DENY");
    response.assert_contains_header("content-security-policy");
}
