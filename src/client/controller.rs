// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gate state machine.
//!
//! ```text
//! Uninitialized -> Loading -> Authenticated | Unauthenticated
//! Unauthenticated -> Submitting -> Authenticated | Unauthenticated(error)
//! any -> logout -> Unauthenticated
//! ```

use tracing::{debug, info, warn};

use super::storage::TokenStore;
use super::transport::{TokenValidator, TransportError, ValidationOutcome};
use crate::config::Environment;

pub const NETWORK_ERROR_MESSAGE: &str = "Failed to validate token. Please check your connection.";
pub const EMPTY_TOKEN_MESSAGE: &str = "Please enter an access token";
pub const LOADING_STATUS: &str = "Checking access...";
pub const SUBMITTING_STATUS: &str = "Validating...";

/// Category of a failed validation, used to pick the gate's hint text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Blank input; no request was made
    EmptyInput,
    MissingToken,
    InvalidToken,
    ServerMisconfigured,
    /// Transport failure; the server's verdict was never received
    Network,
    /// Any other server rejection
    Rejected,
}

/// Why the gate is closed, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl GateFailure {
    fn rejected(status: u16, message: String) -> Self {
        let kind = match status {
            400 => FailureKind::MissingToken,
            401 => FailureKind::InvalidToken,
            500 if message == "Server configuration error" => FailureKind::ServerMisconfigured,
            _ => FailureKind::Rejected,
        };
        Self { kind, message }
    }

    fn network() -> Self {
        Self {
            kind: FailureKind::Network,
            message: NETWORK_ERROR_MESSAGE.to_string(),
        }
    }

    /// Actionable follow-up for the user.
    pub fn hint(&self) -> &'static str {
        match self.kind {
            FailureKind::EmptyInput | FailureKind::MissingToken => {
                "Enter the access token you were given."
            }
            FailureKind::InvalidToken => "Check the token for typos and try again.",
            FailureKind::ServerMisconfigured => {
                "Access is not configured on this deployment. Contact the site administrator."
            }
            FailureKind::Network => "Check your internet connection and try again.",
            FailureKind::Rejected => "Try again in a moment.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Uninitialized,
    Loading,
    Authenticated,
    Unauthenticated {
        error: Option<GateFailure>,
    },
    Submitting,
}

/// What the gate UI should render for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateView {
    pub show_content: bool,
    pub show_form: bool,
    /// Form inputs are disabled while a call is outstanding.
    pub form_disabled: bool,
    pub status: Option<&'static str>,
    pub error: Option<String>,
    pub hint: Option<&'static str>,
}

/// Client side of the access gate.
pub struct GateClient<S, V> {
    environment: Environment,
    store: S,
    validator: V,
    state: GateState,
}

impl<S: TokenStore, V: TokenValidator> GateClient<S, V> {
    pub fn new(environment: Environment, store: S, validator: V) -> Self {
        Self {
            environment,
            store,
            validator,
            state: GateState::Uninitialized,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == GateState::Authenticated
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Restore access on load, revalidating a persisted token if there is one.
    pub async fn initialize(&mut self) -> &GateState {
        if !self.environment.requires_token() {
            debug!(environment = %self.environment, "gate not required");
            self.state = GateState::Authenticated;
            return &self.state;
        }

        self.state = GateState::Loading;

        let persisted = self.store.get().unwrap_or_else(|e| {
            warn!(error = %e, "could not read persisted token");
            None
        });
        let Some(token) = persisted else {
            self.state = GateState::Unauthenticated { error: None };
            return &self.state;
        };

        self.state = match self.validator.validate(&token).await {
            Ok(ValidationOutcome::Accepted { .. }) => {
                info!("persisted token revalidated");
                GateState::Authenticated
            }
            Ok(ValidationOutcome::Rejected { status, error }) => {
                info!(kind = "rejected", status, "persisted token no longer valid");
                self.clear_store();
                GateState::Unauthenticated {
                    error: Some(GateFailure::rejected(status, error)),
                }
            }
            Err(e) => {
                log_transport_failure(&e, "revalidation");
                self.clear_store();
                GateState::Unauthenticated {
                    error: Some(GateFailure::network()),
                }
            }
        };
        &self.state
    }

    /// Validate a token typed by the user, persisting it on success.
    pub async fn submit(&mut self, candidate: &str) -> &GateState {
        if candidate.trim().is_empty() {
            self.state = GateState::Unauthenticated {
                error: Some(GateFailure {
                    kind: FailureKind::EmptyInput,
                    message: EMPTY_TOKEN_MESSAGE.to_string(),
                }),
            };
            return &self.state;
        }

        self.state = GateState::Submitting;

        let failure = match self.validator.validate(candidate).await {
            Ok(ValidationOutcome::Accepted { .. }) => {
                if let Err(e) = self.store.set(candidate) {
                    warn!(error = %e, "could not persist validated token");
                }
                info!("token accepted");
                self.state = GateState::Authenticated;
                return &self.state;
            }
            Ok(ValidationOutcome::Rejected { status, error }) => {
                info!(kind = "rejected", status, "token rejected");
                GateFailure::rejected(status, error)
            }
            Err(e) => {
                log_transport_failure(&e, "submission");
                GateFailure::network()
            }
        };

        // The candidate is never persisted; a previously stored token is
        // dropped, and an empty store is left alone.
        if matches!(self.store.get(), Ok(Some(_))) {
            self.clear_store();
        }
        self.state = GateState::Unauthenticated {
            error: Some(failure),
        };
        &self.state
    }

    /// Forget the persisted token, whatever the current state.
    pub fn logout(&mut self) -> &GateState {
        self.clear_store();
        info!("logged out");
        self.state = GateState::Unauthenticated { error: None };
        &self.state
    }

    pub fn view(&self) -> GateView {
        let closed = |status, disabled, error: Option<&GateFailure>| GateView {
            show_content: false,
            show_form: true,
            form_disabled: disabled,
            status,
            error: error.map(|f| f.message.clone()),
            hint: error.map(GateFailure::hint),
        };

        match &self.state {
            GateState::Authenticated => GateView {
                show_content: true,
                show_form: false,
                form_disabled: false,
                status: None,
                error: None,
                hint: None,
            },
            GateState::Uninitialized | GateState::Loading => GateView {
                show_form: false,
                ..closed(Some(LOADING_STATUS), true, None)
            },
            GateState::Submitting => closed(Some(SUBMITTING_STATUS), true, None),
            GateState::Unauthenticated { error } => closed(None, false, error.as_ref()),
        }
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "could not clear persisted token");
        }
    }
}

fn log_transport_failure(error: &TransportError, during: &'static str) {
    warn!(kind = "transport", during, error = %error, "token validation call failed");
}
