// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Environment;
use crate::contact::ContactDelivery;
use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Deployment tier the service runs as.
    pub environment: Environment,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Token gate status: "open" (production), "ok", or "misconfigured".
    pub access_gate: String,
    /// Contact delivery mode ("webhook" or "log").
    pub contact_delivery: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn check_access_gate(state: &AppState) -> &'static str {
    let settings = &state.settings;
    if !settings.environment.requires_token() {
        "open"
    } else if settings.gate_configured() {
        "ok"
    } else {
        "misconfigured"
    }
}

fn check_contact_delivery(state: &AppState) -> &'static str {
    match state.contact_delivery {
        ContactDelivery::Webhook { .. } => "webhook",
        ContactDelivery::Log => "log",
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let access_gate = check_access_gate(&state);
    let all_ok = access_gate != "misconfigured";

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        environment: state.settings.environment,
        checks: HealthChecks {
            service: "ok".to_string(),
            access_gate: access_gate.to_string(),
            contact_delivery: check_contact_delivery(&state).to_string(),
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Same checks as `/health`.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn state(environment: Environment, secret: Option<&str>) -> AppState {
        AppState::with_delivery(
            Settings::for_environment(environment, secret),
            ContactDelivery::Log,
        )
    }

    #[tokio::test]
    async fn production_gate_is_open() {
        let (status, Json(body)) = health(State(state(Environment::Production, None))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.checks.access_gate, "open");
        assert_eq!(body.checks.contact_delivery, "log");
    }

    #[tokio::test]
    async fn gated_environment_without_secret_is_degraded() {
        let (status, Json(body)) = readiness(State(state(Environment::Test, None))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.access_gate, "misconfigured");
    }

    #[tokio::test]
    async fn gated_environment_with_secret_is_ok() {
        let (status, Json(body)) =
            health(State(state(Environment::Development, Some("abc123")))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.checks.access_gate, "ok");
    }
}
