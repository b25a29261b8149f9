// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Access Control Client
//!
//! Drives the gating experience: decides whether protected content or the
//! token form is shown, and owns the revalidation lifecycle.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = FileTokenStore::new(".site-gate");
//! let validator = HttpTokenValidator::new(&settings.api_base_url)?;
//! let mut gate = GateClient::new(settings.environment, store, validator);
//!
//! gate.initialize().await;
//! if !gate.is_authenticated() {
//!     gate.submit(&token_from_user).await;
//! }
//! render(gate.view());
//! ```
//!
//! Storage and transport are injected so tests can run against in-memory
//! fakes.

pub mod controller;
pub mod storage;
pub mod transport;

pub use controller::{FailureKind, GateClient, GateFailure, GateState, GateView};
pub use storage::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore, STORAGE_KEY};
pub use transport::{HttpTokenValidator, TokenValidator, TransportError, ValidationOutcome};
