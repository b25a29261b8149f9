// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact form endpoint.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header::ALLOW, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::{
    api::cors::ALLOWED_METHODS,
    contact::{validate_submission, RateLimitDecision},
    error::ApiError,
    models::{ContactRequest, ContactResponse},
    state::AppState,
};

pub const SUCCESS_MESSAGE: &str = "Thank you for your message. We'll be in touch soon.";

/// Submit the contact form.
///
/// Each client may submit a limited number of messages per window.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message accepted", body = ContactResponse),
        (status = 400, description = "Invalid submission", body = ContactResponse),
        (status = 405, description = "Method not allowed", body = ContactResponse),
        (status = 413, description = "Request body too large", body = ContactResponse),
        (status = 429, description = "Rate limit exceeded", body = ContactResponse),
        (status = 502, description = "Message could not be delivered", body = ContactResponse)
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ContactResponse>, ApiError> {
    let client = client_key(&headers);

    if let RateLimitDecision::Limited { retry_after } = state.contact_limiter.check(&client) {
        warn!(
            client = %client,
            retry_after_secs = retry_after.as_secs(),
            "contact submission rate limited"
        );
        return Err(ApiError::too_many_requests(retry_after));
    }

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::payload_too_large()
        } else {
            ApiError::bad_request("Invalid request body")
        }
    })?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::bad_request("Request body is required"));
    }
    let request = parse_request(&body)?;

    let submission = validate_submission(request)?;

    state
        .contact_delivery
        .deliver(&submission)
        .await
        .map_err(|e| {
            warn!(reference = %submission.reference, error = %e, "contact delivery failed");
            ApiError::bad_gateway("Failed to send message")
        })?;

    info!(reference = %submission.reference, client = %client, "contact submission accepted");

    Ok(Json(ContactResponse {
        success: true,
        message: Some(SUCCESS_MESSAGE.to_string()),
        error: None,
        reference: Some(submission.reference),
    }))
}

fn parse_request(body: &[u8]) -> Result<ContactRequest, ApiError> {
    let malformed = |_| ApiError::bad_request("Invalid request body");
    let value: serde_json::Value = serde_json::from_slice(body).map_err(malformed)?;
    if !value.is_object() {
        return Err(ApiError::bad_request("Invalid request body"));
    }
    serde_json::from_value(value).map_err(malformed)
}

/// Fallback for every method other than POST and OPTIONS.
pub async fn method_not_allowed() -> Response {
    let mut response = ApiError::method_not_allowed().into_response();
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Rate-limit key for the caller: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then `"unknown"`.
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or("unknown")
        .to_string()
}
