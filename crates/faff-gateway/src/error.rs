// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from domain errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use faff_core::FaffError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`FaffError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub FaffError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(FaffError::InputInvalid(message.into()))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(FaffError::Unauthorized(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FaffError::InputInvalid(_) | FaffError::Conflict(_) => StatusCode::BAD_REQUEST,
            FaffError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            FaffError::NotFound(_) => StatusCode::NOT_FOUND,
            FaffError::Storage { .. } | FaffError::Config(_) | FaffError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<FaffError> for ApiError {
    fn from(err: FaffError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self.0 {
            FaffError::InputInvalid(msg)
            | FaffError::Conflict(msg)
            | FaffError::Unauthorized(msg)
            | FaffError::NotFound(msg) => msg,
            other => {
                tracing::error!(error = %other, "request failed");
                "Internal server error".to_string()
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let resp = ApiError::bad_request("A search query parameter `q` is required.");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(FaffError::Conflict("dup".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::unauthorized("no").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError(FaffError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn server_errors_are_generic() {
        let err = ApiError(FaffError::storage(std::io::Error::other("disk on fire")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_response_serializes() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "something went wrong".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"something went wrong"}"#);
    }
}
