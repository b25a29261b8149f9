// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token gate errors.

use axum::{
    http::{header::ALLOW, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::config::Environment;
use crate::models::ValidationResult;

/// Why a token validation request was refused.
///
/// Every variant maps to a distinct status and message pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// Request had no body at all
    MissingBody,
    /// Body was not a JSON object of the expected shape
    MalformedBody,
    /// Body exceeded the request size limit
    PayloadTooLarge,
    /// HTTP method other than POST or OPTIONS
    MethodNotAllowed,
    /// No token (or an empty one) was submitted
    MissingToken,
    /// Submitted token does not match the expected token
    InvalidToken,
    /// Gate is required but no expected token is configured
    ServerMisconfigured,
    /// Unexpected failure inside the handler
    Internal,
}

impl GateError {
    /// Stable identifier for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            GateError::MissingBody => "missing_body",
            GateError::MalformedBody => "malformed_body",
            GateError::PayloadTooLarge => "payload_too_large",
            GateError::MethodNotAllowed => "method_not_allowed",
            GateError::MissingToken => "missing_token",
            GateError::InvalidToken => "invalid_token",
            GateError::ServerMisconfigured => "server_misconfigured",
            GateError::Internal => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::MissingBody | GateError::MalformedBody | GateError::MissingToken => {
                StatusCode::BAD_REQUEST
            }
            GateError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GateError::InvalidToken => StatusCode::UNAUTHORIZED,
            GateError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GateError::ServerMisconfigured | GateError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Attach the deployment tier reported in the response body.
    pub fn within(self, environment: Environment) -> GateRejection {
        GateRejection {
            error: self,
            environment: Some(environment),
        }
    }
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateError::MissingBody => write!(f, "Request body is required"),
            GateError::MalformedBody => write!(f, "Invalid request body"),
            GateError::PayloadTooLarge => write!(f, "Request body is too large"),
            GateError::MethodNotAllowed => write!(f, "Method not allowed"),
            GateError::MissingToken => write!(f, "Token is required"),
            GateError::InvalidToken => write!(f, "Invalid token"),
            GateError::ServerMisconfigured => write!(f, "Server configuration error"),
            GateError::Internal => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for GateError {}

/// A [`GateError`] together with the environment to report, if known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateRejection {
    pub error: GateError,
    pub environment: Option<Environment>,
}

impl From<GateError> for GateRejection {
    fn from(error: GateError) -> Self {
        Self {
            error,
            environment: None,
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = Json(ValidationResult::denied(
            self.environment,
            self.error.to_string(),
        ));
        let mut response = (status, body).into_response();
        if self.error == GateError::MethodNotAllowed {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST, OPTIONS"));
        }
        response
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        GateRejection::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    const ALL: [GateError; 8] = [
        GateError::MissingBody,
        GateError::MalformedBody,
        GateError::PayloadTooLarge,
        GateError::MethodNotAllowed,
        GateError::MissingToken,
        GateError::InvalidToken,
        GateError::ServerMisconfigured,
        GateError::Internal,
    ];

    #[tokio::test]
    async fn invalid_token_returns_401_with_environment() {
        let response = GateError::InvalidToken
            .within(Environment::Development)
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "valid": false,
                "error": "Invalid token",
                "environment": "development"
            })
        );
    }

    #[tokio::test]
    async fn method_not_allowed_advertises_allowed_methods() {
        let response = GateError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "POST, OPTIONS");
    }

    #[test]
    fn no_two_errors_share_status_and_message() {
        let mut shapes: Vec<_> = ALL
            .iter()
            .map(|e| (e.status_code().as_u16(), e.to_string()))
            .collect();
        shapes.sort();
        shapes.dedup();
        assert_eq!(shapes.len(), ALL.len());
    }
}
