// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token decision logic.
//!
//! Validation is a pure function of the resolved [`Settings`] and the
//! submitted token. Nothing is stored between calls.

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::GateError;
use crate::config::{Environment, Settings};

pub const PRODUCTION_MESSAGE: &str = "Production environment - no token required";
pub const VALID_TOKEN_MESSAGE: &str = "Token is valid";

/// Access granted by a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenGrant {
    pub environment: Environment,
    pub message: &'static str,
}

/// Decide whether `token` grants access in the configured environment.
///
/// Checks run in a fixed order: production bypass, missing token,
/// missing server secret, then the comparison itself.
pub fn validate_token(settings: &Settings, token: Option<&str>) -> Result<TokenGrant, GateError> {
    let environment = settings.environment;

    if !environment.requires_token() {
        debug!(%environment, "token gate bypassed");
        return Ok(TokenGrant {
            environment,
            message: PRODUCTION_MESSAGE,
        });
    }

    let Some(token) = token.filter(|t| !t.is_empty()) else {
        info!(%environment, "token validation rejected: no token submitted");
        return Err(GateError::MissingToken);
    };

    let Some(expected) = settings.expected_token.as_deref() else {
        warn!(
            %environment,
            "token validation failed: no expected token configured"
        );
        return Err(GateError::ServerMisconfigured);
    };

    if tokens_match(token, expected) {
        info!(%environment, "token validated");
        Ok(TokenGrant {
            environment,
            message: VALID_TOKEN_MESSAGE,
        })
    } else {
        info!(%environment, "token validation rejected: token mismatch");
        Err(GateError::InvalidToken)
    }
}

/// Exact equality, compared over digests so timing doesn't track the
/// length of the shared prefix.
fn tokens_match(submitted: &str, expected: &str) -> bool {
    Sha256::digest(submitted.as_bytes()) == Sha256::digest(expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GATED: [Environment; 2] = [Environment::Development, Environment::Test];

    #[test]
    fn gated_environments_require_a_token() {
        for env in GATED {
            let settings = Settings::for_environment(env, Some("abc123"));
            assert_eq!(validate_token(&settings, None), Err(GateError::MissingToken));
            assert_eq!(
                validate_token(&settings, Some("")),
                Err(GateError::MissingToken)
            );
        }
    }

    #[test]
    fn production_accepts_anything() {
        for secret in [None, Some("abc123")] {
            let settings = Settings::for_environment(Environment::Production, secret);
            for token in [None, Some(""), Some("wrong"), Some("abc123")] {
                let grant = validate_token(&settings, token).unwrap();
                assert_eq!(grant.environment, Environment::Production);
                assert_eq!(grant.message, PRODUCTION_MESSAGE);
            }
        }
    }

    #[test]
    fn exact_secret_is_the_only_accepted_token() {
        for env in GATED {
            let settings = Settings::for_environment(env, Some("abc123"));
            assert!(validate_token(&settings, Some("abc123")).is_ok());
            for wrong in ["wrong", "abc1234", "ABC123", " abc123", "abc12"] {
                assert_eq!(
                    validate_token(&settings, Some(wrong)),
                    Err(GateError::InvalidToken),
                    "{wrong:?} must not validate"
                );
            }
        }
    }

    #[test]
    fn unset_secret_is_a_configuration_error() {
        for env in GATED {
            let settings = Settings::for_environment(env, None);
            for token in ["abc123", "anything", " "] {
                assert_eq!(
                    validate_token(&settings, Some(token)),
                    Err(GateError::ServerMisconfigured)
                );
            }
        }
    }

    #[test]
    fn repeated_validation_is_stable() {
        let settings = Settings::for_environment(Environment::Development, Some("abc123"));
        let first = validate_token(&settings, Some("abc123"));
        let second = validate_token(&settings, Some("abc123"));
        assert_eq!(first, second);
        assert_eq!(first.unwrap().message, VALID_TOKEN_MESSAGE);
    }
}
