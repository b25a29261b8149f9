// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Access Gate
//!
//! Server side of the token gate that keeps non-production deployments of
//! the site private.
//!
//! ## Gate Flow
//!
//! 1. The gate client submits `{ "token": "..." }` to `/api/validate-token`
//! 2. Production deployments accept every request without a token
//! 3. Other tiers compare the token to the configured `ACCESS_TOKEN`
//! 4. The result is returned as a [`crate::models::ValidationResult`]
//!
//! ## Security
//!
//! - Submitted tokens are never stored or logged
//! - A missing server secret is reported separately from a wrong token

pub mod error;
pub mod validator;

pub use error::{GateError, GateRejection};
pub use validator::{validate_token, TokenGrant};
