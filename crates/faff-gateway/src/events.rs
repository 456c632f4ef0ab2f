// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime event vocabulary.
//!
//! Every frame is a JSON text message of the form:
//! ```json
//! {"event": "<name>", "data": <payload>}
//! ```
//!
//! Client -> Server: `authenticate`, `typing`, `stop_typing`.
//!
//! Server -> Client: `authenticated`, `auth_error`, `new_message`,
//! `user_typing`, `user_stop_typing`, `user_online`, `user_offline`.

use faff_core::{Message, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound event after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Token is `None` when missing, null or blank.
    Authenticate(Option<String>),
    Typing(Option<UserId>),
    StopTyping(Option<UserId>),
    /// Any event name this gateway does not handle.
    Unknown(String),
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
struct TypingPayload {
    #[serde(rename = "userId", default)]
    user_id: Option<IdRepr>,
    #[serde(rename = "receiverId", default)]
    receiver_id: Option<IdRepr>,
}

/// Ids arrive as numbers from most clients, as strings from some.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

impl IdRepr {
    fn into_user_id(self) -> Option<UserId> {
        match self {
            IdRepr::Number(n) => Some(UserId(n)),
            IdRepr::Text(s) => s.trim().parse().ok().map(UserId),
        }
    }
}

impl ClientEvent {
    /// Decode a text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let frame: RawFrame = serde_json::from_str(text)?;
        Ok(match frame.event.as_str() {
            "authenticate" => ClientEvent::Authenticate(token_from(frame.data)),
            "typing" => ClientEvent::Typing(typing_target(frame.data)),
            "stop_typing" => ClientEvent::StopTyping(typing_target(frame.data)),
            _ => ClientEvent::Unknown(frame.event),
        })
    }
}

/// Accepts a bare string or `{"token": "..."}`.
fn token_from(data: Value) -> Option<String> {
    let token = match data {
        Value::String(s) => s,
        Value::Object(mut map) => match map.remove("token") {
            Some(Value::String(s)) => s,
            _ => return None,
        },
        _ => return None,
    };
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// `userId` wins over `receiverId` when both are present.
fn typing_target(data: Value) -> Option<UserId> {
    let payload: TypingPayload = serde_json::from_value(data).unwrap_or_default();
    payload
        .user_id
        .and_then(IdRepr::into_user_id)
        .or_else(|| payload.receiver_id.and_then(IdRepr::into_user_id))
}

/// An outbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    Authenticated { user_id: UserId, user_name: String },
    AuthError { message: String },
    NewMessage(Message),
    #[serde(rename_all = "camelCase")]
    UserTyping { sender_id: UserId },
    #[serde(rename_all = "camelCase")]
    UserStopTyping { sender_id: UserId },
    #[serde(rename_all = "camelCase")]
    UserOnline { user_id: UserId, user_name: String },
    #[serde(rename_all = "camelCase")]
    UserOffline { user_id: UserId, user_name: String },
}

impl ServerEvent {
    pub fn auth_error(message: impl Into<String>) -> Self {
        ServerEvent::AuthError {
            message: message.into(),
        }
    }

    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Authenticated { .. } => "authenticated",
            ServerEvent::AuthError { .. } => "auth_error",
            ServerEvent::NewMessage(_) => "new_message",
            ServerEvent::UserTyping { .. } => "user_typing",
            ServerEvent::UserStopTyping { .. } => "user_stop_typing",
            ServerEvent::UserOnline { .. } => "user_online",
            ServerEvent::UserOffline { .. } => "user_offline",
        }
    }

    /// Encode as a text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
