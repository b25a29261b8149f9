// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Site Gate - access gate and contact endpoints for the company website
//!
//! Non-production deployments of the site are hidden behind a shared access
//! token. This crate provides the validation service, the client that gates
//! protected content, and the site's rate-limited contact-form endpoint.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token gate decision logic
//! - `client` - Access-control client state machine
//! - `contact` - Contact form validation, rate limiting and delivery
//! - `config` - Typed configuration resolved once at startup

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod contact;
pub mod error;
pub mod models;
pub mod state;
pub mod telemetry;
