// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token issuing and authentication middleware for the gateway.
//!
//! Tokens are HS256 JWTs carrying the numeric `userId` claim. REST routes
//! authenticate with `Authorization: Bearer <token>`; the realtime endpoint
//! authenticates in-band through the `authenticate` event instead.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use faff_config::model::AuthConfig;
use faff_core::{FaffError, TokenVerifier, User, UserId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::AppState;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies signed session tokens.
#[derive(Clone)]
pub struct JwtAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for JwtAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthority")
            .field("secret", &"[redacted]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtAuthority {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.effective_jwt_secret().as_bytes(),
            Duration::from_secs(config.token_ttl_hours * 3600),
        )
    }

    /// Sign a token for `user`.
    pub fn issue(&self, user: UserId) -> Result<String, FaffError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        self.issue_with_expiry(user, now, now.saturating_add(ttl))
    }

    fn issue_with_expiry(&self, user: UserId, iat: i64, exp: i64) -> Result<String, FaffError> {
        let claims = Claims {
            user_id: user.0,
            iat,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| FaffError::Internal(format!("failed to sign token: {e}")))
    }
}

impl TokenVerifier for JwtAuthority {
    fn verify(&self, token: &str) -> Result<UserId, FaffError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| UserId(data.claims.user_id))
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                FaffError::Unauthorized("Invalid token".into())
            })
    }
}

/// The authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Middleware that resolves the bearer token to a stored user.
///
/// Missing header, bad signature, expired token and deleted user all yield 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FaffError::Unauthorized("Access denied. No token provided.".into()))?;

    let user_id = state.verifier.verify(token)?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| FaffError::Unauthorized("Invalid token".into()))?;

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}
