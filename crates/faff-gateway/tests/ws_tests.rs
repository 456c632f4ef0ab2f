// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime protocol tests over real WebSocket connections.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use faff_core::{User, UserId};
use faff_gateway::{AppState, build_router};
use faff_test_utils::TestHarness;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Server {
    harness: TestHarness,
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    async fn start() -> Self {
        let harness = TestHarness::new().await.unwrap();
        let state = AppState::new(harness.store.clone(), harness.embedder.clone(), &harness.config);
        let app = build_router(state.clone(), &harness.config.server).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            harness,
            state,
            addr,
        }
    }

    async fn connect(&self) -> Client {
        let (ws, _) = connect_async(format!("ws://{}/ws", self.addr)).await.unwrap();
        ws
    }

    async fn user(&self, name: &str) -> (User, String) {
        let user = self.harness.create_user(name).await.unwrap();
        let token = self.state.tokens.issue(user.id).unwrap();
        (user, token)
    }

    /// Wait until the registry has seen `n` connections.
    async fn await_connections(&self, n: usize) {
        for _ in 0..100 {
            if self.state.registry.connection_count() == n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {n} live connections");
    }
}

async fn emit(ws: &mut Client, event: &str, data: Value) {
    let frame = json!({"event": event, "data": data}).to_string();
    ws.send(Message::text(frame)).await.unwrap();
}

async fn next_event(ws: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Skip events until one named `name` arrives.
async fn wait_for(ws: &mut Client, name: &str) -> Value {
    loop {
        let event = next_event(ws).await;
        if event["event"] == name {
            return event;
        }
    }
}

/// Read until the connection has been quiet for a moment.
async fn drain(ws: &mut Client) {
    while let Ok(Some(_)) = tokio::time::timeout(Duration::from_millis(200), ws.next()).await {}
}

async fn assert_silent(ws: &mut Client) {
    let outcome = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(outcome.is_err(), "unexpected event: {outcome:?}");
}

async fn login(ws: &mut Client, token: &str) -> Value {
    emit(ws, "authenticate", json!(token)).await;
    wait_for(ws, "authenticated").await
}

#[tokio::test]
async fn authenticate_acknowledges_and_announces() {
    let server = Server::start().await;
    let (alice, token) = server.user("Alice").await;

    let mut c1 = server.connect().await;
    let mut c2 = server.connect().await;
    let mut c3 = server.connect().await;
    server.await_connections(3).await;

    emit(&mut c1, "authenticate", json!(token)).await;
    let ack = next_event(&mut c1).await;
    assert_eq!(
        ack,
        json!({"event": "authenticated", "data": {"userId": alice.id.0, "userName": "Alice"}})
    );

    let expected = json!({"event": "user_online", "data": {"userId": alice.id.0, "userName": "Alice"}});
    assert_eq!(next_event(&mut c2).await, expected);
    assert_eq!(next_event(&mut c3).await, expected);
    assert_silent(&mut c1).await;
}

#[tokio::test]
async fn auth_errors_leave_connection_open() {
    let server = Server::start().await;
    let (_, token) = server.user("Alice").await;
    let ghost = server.state.tokens.issue(UserId(999)).unwrap();
    let mut ws = server.connect().await;

    emit(&mut ws, "authenticate", Value::Null).await;
    assert_eq!(
        next_event(&mut ws).await["data"]["message"],
        "Authentication token not provided."
    );

    emit(&mut ws, "authenticate", json!("not-a-token")).await;
    assert_eq!(
        next_event(&mut ws).await["data"]["message"],
        "Authentication failed. Invalid token."
    );

    emit(&mut ws, "authenticate", json!(ghost)).await;
    assert_eq!(next_event(&mut ws).await["data"]["message"], "User not found.");

    emit(&mut ws, "authenticate", json!(token)).await;
    assert_eq!(next_event(&mut ws).await["event"], "authenticated");
}

#[tokio::test]
async fn typing_is_relayed_to_the_target_only() {
    let server = Server::start().await;
    let (alice, alice_token) = server.user("Alice").await;
    let (bob, bob_token) = server.user("Bob").await;
    let (_, carol_token) = server.user("Carol").await;

    let mut a = server.connect().await;
    let mut b = server.connect().await;
    let mut c = server.connect().await;
    server.await_connections(3).await;
    login(&mut a, &alice_token).await;
    login(&mut b, &bob_token).await;
    login(&mut c, &carol_token).await;
    for ws in [&mut a, &mut b, &mut c] {
        drain(ws).await;
    }

    emit(&mut a, "typing", json!({"userId": bob.id.0})).await;
    assert_eq!(
        next_event(&mut b).await,
        json!({"event": "user_typing", "data": {"senderId": alice.id.0}})
    );

    emit(&mut a, "stop_typing", json!({"receiverId": bob.id.0})).await;
    assert_eq!(
        next_event(&mut b).await,
        json!({"event": "user_stop_typing", "data": {"senderId": alice.id.0}})
    );

    assert_silent(&mut c).await;
}

#[tokio::test]
async fn rest_send_pushes_new_message_to_online_receiver() {
    let server = Server::start().await;
    let (alice, alice_token) = server.user("Alice").await;
    let (bob, bob_token) = server.user("Bob").await;

    let mut b = server.connect().await;
    login(&mut b, &bob_token).await;

    let router = build_router(server.state.clone(), &server.harness.config.server).unwrap();
    let req = Request::builder()
        .method("POST")
        .uri("/api/messages")
        .header(header::AUTHORIZATION, format!("Bearer {alice_token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"receiverId": bob.id.0, "message": "ping"}).to_string(),
        ))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let pushed = next_event(&mut b).await;
    assert_eq!(pushed["event"], "new_message");
    assert_eq!(pushed["data"]["message"], "ping");
    assert_eq!(pushed["data"]["sender_id"], alice.id.0);
}

#[tokio::test]
async fn disconnect_announces_offline() {
    let server = Server::start().await;
    let (alice, alice_token) = server.user("Alice").await;
    let (_, bob_token) = server.user("Bob").await;

    let mut a = server.connect().await;
    let mut b = server.connect().await;
    login(&mut b, &bob_token).await;
    login(&mut a, &alice_token).await;
    wait_for(&mut b, "user_online").await;

    a.close(None).await.unwrap();

    assert_eq!(
        wait_for(&mut b, "user_offline").await,
        json!({"event": "user_offline", "data": {"userId": alice.id.0, "userName": "Alice"}})
    );
    server.await_connections(1).await;
    assert!(!server.state.registry.is_online(alice.id));
}

#[tokio::test]
async fn newer_login_survives_older_disconnect() {
    let server = Server::start().await;
    let (alice, token) = server.user("Alice").await;

    let mut first = server.connect().await;
    let mut second = server.connect().await;
    login(&mut first, &token).await;
    login(&mut second, &token).await;
    drain(&mut second).await;

    first.close(None).await.unwrap();
    server.await_connections(1).await;

    assert!(server.state.registry.is_online(alice.id));
    assert_silent(&mut second).await;
}
