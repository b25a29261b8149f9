// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token validation endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{self, GateError, GateRejection},
    models::{ValidateTokenRequest, ValidationResult},
    state::AppState,
};

/// Validate an access token for the current deployment.
///
/// Production deployments accept every request. Other tiers require the
/// token to match the configured `ACCESS_TOKEN` exactly.
#[utoipa::path(
    post,
    path = "/api/validate-token",
    tag = "Access Gate",
    request_body = ValidateTokenRequest,
    responses(
        (status = 200, description = "Token accepted", body = ValidationResult),
        (status = 400, description = "Missing body or token", body = ValidationResult),
        (status = 401, description = "Token does not match", body = ValidationResult),
        (status = 405, description = "Method not allowed", body = ValidationResult),
        (status = 413, description = "Request body too large", body = ValidationResult),
        (status = 500, description = "Server configuration or internal error", body = ValidationResult)
    )
)]
pub async fn validate_token(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ValidationResult>, GateRejection> {
    let environment = state.settings.environment;

    let body = body.map_err(|rejection| body_error(&rejection).within(environment))?;
    let request = parse_request(&body).map_err(|e| e.within(environment))?;
    let grant = auth::validate_token(&state.settings, request.token.as_deref())
        .map_err(|e| e.within(environment))?;

    Ok(Json(ValidationResult::granted(
        grant.environment,
        grant.message,
    )))
}

/// Fallback for every method other than POST and OPTIONS.
pub async fn method_not_allowed() -> GateError {
    GateError::MethodNotAllowed
}

fn body_error(rejection: &BytesRejection) -> GateError {
    tracing::debug!(error = %rejection, "failed to read validation request body");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GateError::PayloadTooLarge
    } else {
        GateError::MalformedBody
    }
}

fn parse_request(body: &[u8]) -> Result<ValidateTokenRequest, GateError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GateError::MissingBody);
    }
    let malformed = |e: serde_json::Error| {
        tracing::debug!(error = %e, "rejecting malformed validation request");
        GateError::MalformedBody
    };
    // Only a JSON object is a request; serde would also accept an array.
    let value: serde_json::Value = serde_json::from_slice(body).map_err(malformed)?;
    if !value.is_object() {
        tracing::debug!("rejecting non-object validation request");
        return Err(GateError::MalformedBody);
    }
    serde_json::from_value(value).map_err(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, Settings};
    use axum::{extract::State, http::StatusCode, response::IntoResponse};

    fn state(environment: Environment, secret: Option<&str>) -> AppState {
        AppState::with_delivery(
            Settings::for_environment(environment, secret),
            crate::contact::ContactDelivery::Log,
        )
    }

    async fn call(state: AppState, body: &str) -> (StatusCode, serde_json::Value) {
        let response = validate_token(State(state), Ok(Bytes::from(body.to_string())))
            .await
            .into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn development_scenario() {
        let state = state(Environment::Development, Some("abc123"));

        let (status, body) = call(state.clone(), r#"{"token":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Token is required");
        assert_eq!(body["environment"], "development");

        let (status, body) = call(state.clone(), r#"{"token":"wrong"}"#).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");

        let (status, body) = call(state, r#"{"token":"abc123"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["environment"], "development");
    }

    #[tokio::test]
    async fn production_needs_no_token() {
        let state = state(Environment::Production, None);
        for body in [r#"{}"#, r#"{"token":"anything"}"#] {
            let (status, body) = call(state.clone(), body).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["valid"], true);
            assert_eq!(body["message"], "Production environment - no token required");
        }
    }

    #[tokio::test]
    async fn test_environment_without_secret_is_misconfigured() {
        let (status, body) = call(state(Environment::Test, None), r#"{"token":"abc123"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server configuration error");
        assert_eq!(body["environment"], "test");
    }

    #[tokio::test]
    async fn body_problems_are_reported_separately() {
        let state = state(Environment::Development, Some("abc123"));

        let (status, body) = call(state.clone(), "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Request body is required");

        let (status, body) = call(state.clone(), "token=abc123").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");

        let (status, body) = call(state.clone(), r#"{"token":42}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");

        for non_object in ["[]", r#"["abc123"]"#, "null", "\"abc123\""] {
            let (status, body) = call(state.clone(), non_object).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{non_object}");
            assert_eq!(body["error"], "Invalid request body", "{non_object}");
        }
    }

    #[tokio::test]
    async fn production_still_rejects_array_bodies() {
        let (status, body) = call(state(Environment::Production, None), "[]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[test]
    fn missing_token_field_parses() {
        assert_eq!(parse_request(b"{}"), Ok(ValidateTokenRequest::default()));
        assert_eq!(parse_request(b"  \n"), Err(GateError::MissingBody));
        assert_eq!(parse_request(b"[]"), Err(GateError::MalformedBody));
    }
}
