// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the site's two public endpoints. All
//! types derive `ToSchema` for the OpenAPI document served at `/docs`.
//!
//! ## Model Categories
//!
//! - **Token gate**: [`ValidateTokenRequest`] / [`ValidationResult`]
//! - **Contact form**: [`ContactRequest`] / [`ContactResponse`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Environment;

// =============================================================================
// Token Gate Models
// =============================================================================

/// Body of `POST /api/validate-token`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ValidateTokenRequest {
    /// Candidate access token. May be absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ValidateTokenRequest {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

/// Outcome of a single validation exchange.
///
/// Produced per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the token grants access.
    pub valid: bool,
    /// Deployment tier that made the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    /// Informational message on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Human-readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn granted(environment: Environment, message: impl Into<String>) -> Self {
        Self {
            valid: true,
            environment: Some(environment),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn denied(environment: Option<Environment>, error: impl Into<String>) -> Self {
        Self {
            valid: false,
            environment,
            message: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// Contact Models
// =============================================================================

/// Body of `POST /api/contact`.
///
/// Every field defaults to empty so that missing fields surface as
/// validation messages instead of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Response of `POST /api/contact`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Reference id of an accepted submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Uuid>,
}

/// A validated submission as handed to delivery.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContactSubmission {
    pub reference: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub received_at: DateTime<Utc>,
}
