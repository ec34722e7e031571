mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{Value, json};
use shortlink_resolver::domain::click_event::ClickEvent;
use shortlink_resolver::domain::repositories::ClickRepository;

// ─── POST /links ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_link_anonymous() {
    let app = TestApp::new();
    let server = app.server();

    let response = server
        .post("/links")
        .json(&json!({ "destinationUrl": "https://example.com/landing" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<Value>();
    let code = body["shortCode"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert_eq!(body["shortUrl"], format!("https://{}/{code}", common::DEFAULT_DOMAIN));
    assert_eq!(body["destinationUrl"], "https://example.com/landing");
    assert_eq!(body["ownerId"], Value::Null);
    assert_eq!(body["clickCount"], 0);
    assert_eq!(body["active"], true);
    assert_eq!(body["passwordProtected"], false);
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_create_link_with_token_sets_owner() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let response = app
        .server()
        .post("/links")
        .authorization_bearer(&token)
        .json(&json!({
            "destinationUrl": "https://example.com",
            "customAlias": "promo",
            "password": "open-sesame",
            "maxClicks": 5
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["shortCode"], "promo");
    assert_eq!(body["ownerId"], "alice");
    assert_eq!(body["maxClicks"], 5);
    assert_eq!(body["passwordProtected"], true);
}

#[tokio::test]
async fn test_create_link_alias_conflict() {
    let app = TestApp::new();
    let server = app.server();
    let payload = json!({ "destinationUrl": "https://example.com", "customAlias": "taken" });

    server.post("/links").json(&payload).await;
    let response = server.post("/links").json(&payload).await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "alias_conflict");
}

#[tokio::test]
async fn test_create_link_validation_errors() {
    let app = TestApp::new();
    let server = app.server();

    let cases = [
        json!({ "destinationUrl": "not a url" }),
        json!({ "destinationUrl": "ftp://example.com/file" }),
        json!({ "destinationUrl": "https://example.com", "maxClicks": 0 }),
        json!({ "destinationUrl": "https://example.com", "isOneTime": true, "maxClicks": 3 }),
        json!({ "destinationUrl": "https://example.com", "customAlias": "bad alias" }),
        json!({ "destinationUrl": "https://example.com", "customAlias": "links" }),
        json!({ "destinationUrl": "https://example.com", "expiresAt": "2001-01-01T00:00:00Z" }),
    ];

    for payload in cases {
        let response = server.post("/links").json(&payload).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(response.json::<Value>()["error"]["code"], "validation_error", "{payload}");
    }
}

#[tokio::test]
async fn test_create_link_invalid_token() {
    let app = TestApp::new();

    let response = app
        .server()
        .post("/links")
        .authorization_bearer("not-a-real-token")
        .json(&json!({ "destinationUrl": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), "Bearer");
}

// ─── GET /links ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_links_requires_token() {
    let app = TestApp::new();

    let response = app.server().get("/links").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_list_links_only_own_and_paginated() {
    let app = TestApp::new();
    let alice = app.token_for("alice").await;
    let bob = app.token_for("bob").await;
    let server = app.server();

    for i in 0..3 {
        server
            .post("/links")
            .authorization_bearer(&alice)
            .json(&json!({ "destinationUrl": format!("https://example.com/{i}") }))
            .await
            .assert_status(StatusCode::CREATED);
    }
    server
        .post("/links")
        .authorization_bearer(&bob)
        .json(&json!({ "destinationUrl": "https://example.com/bob" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .get("/links")
        .authorization_bearer(&alice)
        .add_query_param("page", 1)
        .add_query_param("pageSize", 2)
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 2);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item["ownerId"] == "alice"));

    let second = server
        .get("/links")
        .authorization_bearer(&alice)
        .add_query_param("page", 2)
        .add_query_param("pageSize", 2)
        .await
        .json::<Value>();
    assert_eq!(second["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_links_rejects_page_size() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    let response = app
        .server()
        .get("/links")
        .authorization_bearer(&token)
        .add_query_param("pageSize", 500)
        .await;

    response.assert_status_bad_request();
}

// ─── GET /links/{code} ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_link_with_click_summary() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    let server = app.server();

    let created = server
        .post("/links")
        .authorization_bearer(&token)
        .json(&json!({ "destinationUrl": "https://example.com", "customAlias": "stats1" }))
        .await
        .json::<Value>();
    assert_eq!(created["shortCode"], "stats1");

    let link = app
        .state
        .link_service
        .get_link("alice", &shortlink_resolver::domain::entities::LinkKey::default_domain("stats1"))
        .await
        .unwrap()
        .0;
    for referrer in [Some("https://www.google.com/"), None] {
        app.click_store
            .record(&ClickEvent::new(
                link.id,
                None,
                "stats1".to_string(),
                Some("203.0.113.7".to_string()),
                Some("Mozilla/5.0"),
                referrer,
            ))
            .await
            .unwrap();
    }

    let response = server
        .get("/links/stats1")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["shortCode"], "stats1");
    assert_eq!(body["clicks"]["total"], 2);
    assert_eq!(body["clicks"]["byReferrer"]["search"], 1);
    assert_eq!(body["clicks"]["byReferrer"]["direct"], 1);
    assert!(body["clicks"]["lastClickedAt"].is_string());
}

#[tokio::test]
async fn test_get_link_of_other_owner_is_not_found() {
    let app = TestApp::new();
    let alice = app.token_for("alice").await;
    let bob = app.token_for("bob").await;
    let server = app.server();

    server
        .post("/links")
        .authorization_bearer(&alice)
        .json(&json!({ "destinationUrl": "https://example.com", "customAlias": "mine" }))
        .await;

    server
        .get("/links/mine")
        .authorization_bearer(&bob)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_get_link_on_domain() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    let server = app.server();

    server
        .post("/links")
        .authorization_bearer(&token)
        .json(&json!({
            "destinationUrl": "https://example.com",
            "customAlias": "promo",
            "domain": "go.example.com"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .get("/links/promo")
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();

    let response = server
        .get("/links/promo")
        .authorization_bearer(&token)
        .add_query_param("domain", "go.example.com")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["shortUrl"], "https://go.example.com/promo");
}

// ─── DELETE /links/{code} ────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_link_flow() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;
    let server = app.server();

    server
        .post("/links")
        .authorization_bearer(&token)
        .json(&json!({ "destinationUrl": "https://example.com", "customAlias": "del001" }))
        .await;

    server
        .delete("/links/del001")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server.get("/del001").await.assert_status_not_found();

    // Deleting again is a no-op.
    server
        .delete("/links/del001")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    // The code is free again.
    server
        .post("/links")
        .authorization_bearer(&token)
        .json(&json!({ "destinationUrl": "https://example.org", "customAlias": "del001" }))
        .await
        .assert_status(StatusCode::CREATED);
    assert_eq!(
        server.get("/del001").await.header("location"),
        "https://example.org"
    );
}

#[tokio::test]
async fn test_delete_link_not_found() {
    let app = TestApp::new();
    let token = app.token_for("alice").await;

    app.server()
        .delete("/links/nonexistent")
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_delete_link_requires_token() {
    let app = TestApp::new();

    let response = app.server().delete("/links/anything").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
