// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::GateError,
    config::Environment,
    models::{ContactRequest, ContactResponse, ValidateTokenRequest, ValidationResult},
    state::AppState,
};

pub mod contact;
pub mod cors;
pub mod health;
pub mod validate_token;

/// Largest request body accepted by the `/api` endpoints.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    // OPTIONS never reaches the method routers: the CORS layer answers it.
    let api_routes = Router::new()
        .route(
            "/validate-token",
            post(validate_token::validate_token).fallback(validate_token::method_not_allowed),
        )
        .route(
            "/contact",
            post(contact::submit_contact).fallback(contact::method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors::layer())
        .layer(middleware::from_fn(cors::complete));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Map a handler panic to the internal-failure body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    GateError::Internal.into_response()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        validate_token::validate_token,
        contact::submit_contact,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Environment,
            ValidateTokenRequest,
            ValidationResult,
            ContactRequest,
            ContactResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Access Gate", description = "Token validation for gated deployments"),
        (name = "Contact", description = "Contact form submission"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
