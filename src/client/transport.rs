// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Calls to the token validation endpoint.

use std::future::Future;

use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::Environment;
use crate::models::{ValidateTokenRequest, ValidationResult};

pub const VALIDATE_TOKEN_PATH: &str = "api/validate-token";

/// Transport-level failure: the server's verdict was never received.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),

    #[error("validation request failed: {0}")]
    Network(String),

    #[error("validation response was invalid (status {status}): {reason}")]
    InvalidResponse { status: u16, reason: String },
}

/// The server's verdict on a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted {
        environment: Option<Environment>,
        message: Option<String>,
    },
    Rejected {
        status: u16,
        error: String,
    },
}

/// Capability to ask the validation service about a token.
pub trait TokenValidator {
    fn validate(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<ValidationOutcome, TransportError>> + Send;
}

/// [`TokenValidator`] talking to `POST {api_base_url}/api/validate-token`.
#[derive(Debug, Clone)]
pub struct HttpTokenValidator {
    endpoint: Url,
    http: Client,
}

impl HttpTokenValidator {
    pub fn new(api_base_url: &Url) -> Result<Self, TransportError> {
        let endpoint = endpoint_for(api_base_url)?;
        let http = Client::builder()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, token: &str) -> Result<ValidationOutcome, TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&ValidateTokenRequest::new(token))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        interpret_body(status, &body)
    }
}

/// Append the endpoint path to the base URL, keeping any path prefix.
fn endpoint_for(api_base_url: &Url) -> Result<Url, TransportError> {
    let mut endpoint = api_base_url.clone();
    endpoint.set_query(None);
    endpoint.set_fragment(None);
    endpoint
        .path_segments_mut()
        .map_err(|()| {
            TransportError::InvalidUrl(format!("{api_base_url} cannot be a base URL"))
        })?
        .pop_if_empty()
        .extend(VALIDATE_TOKEN_PATH.split('/'));
    Ok(endpoint)
}

fn interpret_body(status: StatusCode, body: &[u8]) -> Result<ValidationOutcome, TransportError> {
    match serde_json::from_slice::<ValidationResult>(body) {
        Ok(result) => Ok(interpret(status.as_u16(), result)),
        // Something in front of the service answered, e.g. a proxy error page.
        Err(_) if !status.is_success() => Ok(ValidationOutcome::Rejected {
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        }),
        Err(e) => Err(TransportError::InvalidResponse {
            status: status.as_u16(),
            reason: e.to_string(),
        }),
    }
}

fn interpret(status: u16, body: ValidationResult) -> ValidationOutcome {
    if (200..300).contains(&status) && body.valid {
        ValidationOutcome::Accepted {
            environment: body.environment,
            message: body.message,
        }
    } else {
        ValidationOutcome::Rejected {
            status,
            error: body.error.unwrap_or_else(|| "Invalid token".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_joined_to_base_url() {
        let base = Url::parse("https://preview.example.com/").unwrap();
        let validator = HttpTokenValidator::new(&base).unwrap();
        assert_eq!(
            validator.endpoint().as_str(),
            "https://preview.example.com/api/validate-token"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        for base in [
            "https://site.example.com/preview",
            "https://site.example.com/preview/",
        ] {
            let validator = HttpTokenValidator::new(&Url::parse(base).unwrap()).unwrap();
            assert_eq!(
                validator.endpoint().as_str(),
                "https://site.example.com/preview/api/validate-token",
                "{base}"
            );
        }

        let bare = Url::parse("http://localhost:8080").unwrap();
        assert_eq!(
            HttpTokenValidator::new(&bare).unwrap().endpoint().as_str(),
            "http://localhost:8080/api/validate-token"
        );
    }

    #[test]
    fn non_json_error_pages_are_rejections() {
        let outcome = interpret_body(
            StatusCode::PAYLOAD_TOO_LARGE,
            b"Failed to buffer the request body: length limit exceeded",
        )
        .unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Rejected {
                status: 413,
                error: "Payload Too Large".to_string(),
            }
        );

        let err = interpret_body(StatusCode::OK, b"<html>").unwrap_err();
        assert!(matches!(
            err,
            TransportError::InvalidResponse { status: 200, .. }
        ));
    }

    #[test]
    fn success_requires_valid_flag() {
        let accepted = interpret(
            200,
            ValidationResult::granted(Environment::Test, "Token is valid"),
        );
        assert_eq!(
            accepted,
            ValidationOutcome::Accepted {
                environment: Some(Environment::Test),
                message: Some("Token is valid".to_string()),
            }
        );

        let mut odd = ValidationResult::granted(Environment::Test, "Token is valid");
        odd.valid = false;
        assert!(matches!(
            interpret(200, odd),
            ValidationOutcome::Rejected { status: 200, .. }
        ));
    }

    #[test]
    fn rejection_carries_server_message() {
        let outcome = interpret(
            401,
            ValidationResult::denied(Some(Environment::Development), "Invalid token"),
        );
        assert_eq!(
            outcome,
            ValidationOutcome::Rejected {
                status: 401,
                error: "Invalid token".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{addr}/")).unwrap();
        let validator = HttpTokenValidator::new(&base).unwrap();
        let err = validator.validate("abc123").await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}
