// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST API tests driven through the router with `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use faff_gateway::{AppState, build_router};
use faff_test_utils::{FailureMode, TestHarness};
use serde_json::{Value, json};
use tower::ServiceExt;

struct Api {
    harness: TestHarness,
    state: AppState,
    router: Router,
}

impl Api {
    async fn new() -> Self {
        let harness = TestHarness::new().await.unwrap();
        let state = AppState::new(harness.store.clone(), harness.embedder.clone(), &harness.config);
        let router = build_router(state.clone(), &harness.config.server).unwrap();
        Self {
            harness,
            state,
            router,
        }
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Register a user and return `(id, token)`.
    async fn register(&self, name: &str) -> (i64, String) {
        let (status, body) = self
            .call(
                "POST",
                "/api/users",
                None,
                Some(json!({
                    "name": name,
                    "email": format!("{}@example.com", name.to_lowercase()),
                    "password": "hunter22"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["user"]["id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }
}

#[tokio::test]
async fn register_returns_user_and_token() {
    let api = Api::new().await;
    let (status, body) = api
        .call(
            "POST",
            "/api/users",
            None,
            Some(json!({"name": "Alice", "email": "alice@example.com", "password": "secret1"})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["name"], "Alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn register_validates_input() {
    let api = Api::new().await;

    let (status, body) = api
        .call("POST", "/api/users", None, Some(json!({"name": "Alice"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name, email, and password are required");

    let (status, body) = api
        .call(
            "POST",
            "/api/users",
            None,
            Some(json!({"name": "Alice", "email": "a@example.com", "password": "123"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 6 characters long");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let api = Api::new().await;
    api.register("Alice").await;

    let (status, body) = api
        .call(
            "POST",
            "/api/users",
            None,
            Some(json!({"name": "Alice Two", "email": "alice@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User with this email already exists");
}

#[tokio::test]
async fn login_checks_credentials() {
    let api = Api::new().await;
    let (id, _) = api.register("Alice").await;

    let (status, body) = api
        .call(
            "POST",
            "/api/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "hunter22"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id);

    let (status, body) = api
        .call(
            "POST",
            "/api/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = api
        .call(
            "POST",
            "/api/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "hunter22"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = api
        .call("POST", "/api/login", None, Some(json!({"email": "alice@example.com"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let api = Api::new().await;
    let (id, token) = api.register("Alice").await;

    let (status, _) = api.call("GET", "/api/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = api.call("GET", "/api/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = api.call("GET", "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id);
}

#[tokio::test]
async fn users_are_listed_by_name() {
    let api = Api::new().await;
    api.register("Zed").await;
    let (_, token) = api.register("Alice").await;

    let (status, body) = api.call("GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Alice", "Zed"]);
}

#[tokio::test]
async fn send_then_read_conversation_both_ways() {
    let api = Api::new().await;
    let (alice, alice_token) = api.register("Alice").await;
    let (bob, bob_token) = api.register("Bob").await;

    let (status, sent) = api
        .call(
            "POST",
            "/api/messages",
            Some(&alice_token),
            Some(json!({"receiverId": bob, "message": "  hi bob  "})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["message"], "hi bob");
    assert_eq!(sent["sender_id"], alice);
    assert!(sent.get("embedding").is_none());

    let (status, by_path) = api
        .call("GET", &format!("/api/conversation/{alice}"), Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_path[0]["message"], "hi bob");
    assert_eq!(by_path[0]["sender_name"], "Alice");

    let (status, by_query) = api
        .call(
            "GET",
            &format!("/api/messages/conversation?otherUserId={bob}"),
            Some(&alice_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_query, by_path);
}

#[tokio::test]
async fn send_validates_fields() {
    let api = Api::new().await;
    let (_, token) = api.register("Alice").await;

    for body in [
        json!({"message": "hello"}),
        json!({"receiverId": 2}),
        json!({"receiverId": 2, "message": "   "}),
    ] {
        let (status, resp) = api
            .call("POST", "/api/messages", Some(&token), Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            resp["error"],
            "Missing or invalid required fields: receiverId and message."
        );
    }
}

#[tokio::test]
async fn conversation_rejects_non_numeric_ids() {
    let api = Api::new().await;
    let (_, token) = api.register("Alice").await;

    let (status, body) = api
        .call("GET", "/api/conversation/abc", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A valid otherUserId path parameter is required.");

    let (status, _) = api
        .call("GET", "/api/messages/conversation", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn semantic_search_ranks_and_scores() {
    let api = Api::new().await;
    let (_, alice_token) = api.register("Alice").await;
    let (bob, _) = api.register("Bob").await;

    for text in ["pizza at eight tonight", "tax documents attached", "pizza is great"] {
        api.call(
            "POST",
            "/api/messages",
            Some(&alice_token),
            Some(json!({"receiverId": bob, "message": text})),
        )
        .await;
    }

    let (status, body) = api
        .call(
            "GET",
            "/api/semantic-search?q=pizza%20at%20eight%20tonight&limit=2",
            Some(&alice_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["message"], "pizza at eight tonight");
    assert_eq!(results[0]["sender_name"], "Alice");
    assert_eq!(results[0]["receiver_name"], "Bob");
    let first = results[0]["similarity_score"].as_f64().unwrap();
    let second = results[1]["similarity_score"].as_f64().unwrap();
    assert!(first >= second);
    assert!((first - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn search_validates_query_and_limit() {
    let api = Api::new().await;
    let (_, token) = api.register("Alice").await;

    let (status, body) = api
        .call("GET", "/api/messages/search", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A search query parameter `q` is required.");

    let (status, _) = api
        .call("GET", "/api/semantic-search?q=hi&limit=zero", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_during_provider_outage_is_empty_success() {
    let api = Api::new().await;
    let (_, token) = api.register("Alice").await;
    let (bob, _) = api.register("Bob").await;
    api.call(
        "POST",
        "/api/messages",
        Some(&token),
        Some(json!({"receiverId": bob, "message": "still stored"})),
    )
    .await;

    api.harness.embedder.set_failure(FailureMode::Always).await;
    let (status, body) = api
        .call("GET", "/api/messages/search?q=stored", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn send_succeeds_without_embeddings() {
    let api = Api::new().await;
    let (_, token) = api.register("Alice").await;
    let (bob, _) = api.register("Bob").await;
    api.harness.embedder.set_failure(FailureMode::Always).await;

    let (status, _) = api
        .call(
            "POST",
            "/api/messages",
            Some(&token),
            Some(json!({"receiverId": bob, "message": "no vector for me"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn health_reports_database() {
    let api = Api::new().await;
    let (status, body) = api.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK", "db": "connected"}));
    assert_eq!(api.state.registry.connection_count(), 0);
}

#[tokio::test]
async fn unknown_api_route_is_404() {
    let api = Api::new().await;
    let (status, body) = api.call("GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "API route not found");
}
