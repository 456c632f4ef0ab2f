// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the REST API.
//!
//! Accounts: `POST /api/users`, `POST /api/login`, `GET /api/me`, `GET /api/users`.
//! Messages: `POST /api/messages`, `GET /api/conversation/{id}`,
//! `GET /api/messages/conversation`, `GET /api/messages/search`,
//! `GET /api/semantic-search`.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use faff_core::{
    ConversationMessage, FaffError, HealthStatus, Message, NewUser, ScoredMessage, User, UserId,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{ApiError, ErrorResponse};
use crate::events::ServerEvent;
use crate::server::AppState;

/// Public account fields returned by the account endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Response body for register and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: String,
}

/// Response body for GET /api/me.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserView,
}

/// Request body for POST /api/users.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for POST /api/login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for POST /api/messages.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "receiverId", default)]
    pub receiver_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    #[serde(rename = "otherUserId", default)]
    pub other_user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub db: &'static str,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_user_id(raw: Option<&str>) -> Option<UserId> {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).map(UserId)
}

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        non_blank(body.name),
        non_blank(body.email),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Name, email, and password are required"));
    };

    if password.chars().count() < state.min_password_len {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters long",
            state.min_password_len
        )));
    }

    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password,
        })
        .await?;
    let token = state.tokens.issue(user.id)?;
    tracing::info!(user = %user.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (
        non_blank(body.email),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let Some(stored) = state.users.find_by_email(&email).await? else {
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    // Hash verification is CPU-bound; keep it off the async workers.
    let users = state.users.clone();
    let hash = stored.password_hash;
    let valid = tokio::task::spawn_blocking(move || users.verify_credential(&password, &hash))
        .await
        .map_err(|e| FaffError::Internal(format!("credential check panicked: {e}")))?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.tokens.issue(stored.user.id)?;
    Ok(Json(AuthResponse {
        user: stored.user.into(),
        token,
    }))
}

/// GET /api/me
pub async fn me(Extension(AuthUser(user)): Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse { user: user.into() })
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

/// POST /api/messages
///
/// Persists the message, then pushes `new_message` to the receiver if online.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(AuthUser(sender)): Extension<AuthUser>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let (Some(receiver), Some(text)) = (body.receiver_id.map(UserId), non_blank(body.message))
    else {
        return Err(ApiError::bad_request(
            "Missing or invalid required fields: receiverId and message.",
        ));
    };

    let message = state.messages.send(sender.id, receiver, &text).await?;
    state
        .registry
        .send_to_user(receiver, ServerEvent::NewMessage(message.clone()));

    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/conversation/{otherUserId}
pub async fn conversation_by_path(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(other): Path<String>,
) -> Result<Json<Vec<ConversationMessage>>, ApiError> {
    let other = parse_user_id(Some(&other)).ok_or_else(|| {
        ApiError::bad_request("A valid otherUserId path parameter is required.")
    })?;
    Ok(Json(state.messages.conversation(user.id, other, None).await?))
}

/// GET /api/messages/conversation?otherUserId=
pub async fn conversation_by_query(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<ConversationMessage>>, ApiError> {
    let other = parse_user_id(query.other_user_id.as_deref()).ok_or_else(|| {
        ApiError::bad_request("A valid `otherUserId` query parameter is required.")
    })?;
    Ok(Json(state.messages.conversation(user.id, other, None).await?))
}

/// GET /api/messages/search?q= and GET /api/semantic-search?q=&limit=
pub async fn search(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ScoredMessage>>, ApiError> {
    let Some(q) = non_blank(query.q) else {
        return Err(ApiError::bad_request(
            "A search query parameter `q` is required.",
        ));
    };
    let limit = match non_blank(query.limit) {
        None => None,
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Some(n),
            _ => return Err(ApiError::bad_request("`limit` must be a positive integer.")),
        },
    };

    Ok(Json(state.search.search(user.id, &q, limit).await?))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    let healthy = matches!(
        state.storage.health_check().await,
        Ok(HealthStatus::Healthy)
    );
    if healthy {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "OK",
                db: "connected",
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "UNAVAILABLE",
                db: "unreachable",
            }),
        )
            .into_response()
    }
}

/// Fallback for unknown `/api/*` routes.
pub async fn api_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "API route not found".into(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_uses_camel_case_receiver() {
        let req: SendMessageRequest =
            serde_json::from_str(r#"{"receiverId": 4, "message": "hey"}"#).unwrap();
        assert_eq!(req.receiver_id, Some(4));
        assert_eq!(req.message.as_deref(), Some("hey"));
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"name": "Alice"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Alice"));
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }

    #[test]
    fn blank_strings_are_missing() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" a ".into())), Some("a".into()));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn user_ids_parse_from_text() {
        assert_eq!(parse_user_id(Some("12")), Some(UserId(12)));
        assert_eq!(parse_user_id(Some("abc")), None);
        assert_eq!(parse_user_id(None), None);
    }

    #[test]
    fn user_view_omits_timestamps() {
        let view = UserView::from(User {
            id: UserId(1),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
        });
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "name": "Alice", "email": "alice@example.com"}));
    }

    #[test]
    fn health_response_serializes() {
        let json = serde_json::to_string(&HealthResponse {
            status: "OK",
            db: "connected",
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"OK","db":"connected"}"#);
    }
}
