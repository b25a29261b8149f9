// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read through a [`ConfigProvider`] exactly once at startup
//! and resolved into an immutable [`Settings`] value that is injected into
//! request handlers via `AppState`. Nothing reads the process environment
//! after that point.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_ENV` | Deployment tier (`development`, `test`, `production`) | `production` |
//! | `ACCESS_TOKEN` | Expected gate token | Required outside production |
//! | `API_BASE_URL` | Base URL gate clients use to reach the API | `http://localhost:8080` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `TLS_CERT_PATH` | PEM certificate chain for HTTPS | Optional |
//! | `TLS_KEY_PATH` | PEM private key for HTTPS | Optional |
//! | `CONTACT_RATE_LIMIT_MAX` | Contact submissions allowed per window | `5` |
//! | `CONTACT_RATE_LIMIT_WINDOW_SECS` | Contact rate-limit window | `900` |
//! | `CONTACT_WEBHOOK_URL` | Webhook receiving contact submissions | Optional (log only) |

use std::{collections::HashMap, fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

pub const APP_ENV_ENV: &str = "APP_ENV";
pub const ACCESS_TOKEN_ENV: &str = "ACCESS_TOKEN";
pub const API_BASE_URL_ENV: &str = "API_BASE_URL";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const CONTACT_RATE_LIMIT_MAX_ENV: &str = "CONTACT_RATE_LIMIT_MAX";
pub const CONTACT_RATE_LIMIT_WINDOW_SECS_ENV: &str = "CONTACT_RATE_LIMIT_WINDOW_SECS";
pub const CONTACT_WEBHOOK_URL_ENV: &str = "CONTACT_WEBHOOK_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CONTACT_RATE_LIMIT_MAX: u32 = 5;
pub const DEFAULT_CONTACT_RATE_LIMIT_WINDOW_SECS: u64 = 900;

/// Upper bound on distinct clients tracked by the contact rate limiter.
pub const CONTACT_RATE_LIMIT_CAPACITY: usize = 10_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unrecognised environment '{0}' (expected development, test or production)")]
    InvalidEnvironment(String),

    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} is not a valid URL: {reason}")]
    InvalidUrl { key: &'static str, reason: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
}

/// Deployment tier controlling whether the token challenge applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    #[default]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    /// Production deployments are public; every other tier is gated.
    pub fn requires_token(&self) -> bool {
        !matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Every configuration key the service recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Environment,
    AccessToken,
    ApiBaseUrl,
    Host,
    Port,
    LogFormat,
    TlsCertPath,
    TlsKeyPath,
    ContactRateLimitMax,
    ContactRateLimitWindowSecs,
    ContactWebhookUrl,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 11] = [
        ConfigKey::Environment,
        ConfigKey::AccessToken,
        ConfigKey::ApiBaseUrl,
        ConfigKey::Host,
        ConfigKey::Port,
        ConfigKey::LogFormat,
        ConfigKey::TlsCertPath,
        ConfigKey::TlsKeyPath,
        ConfigKey::ContactRateLimitMax,
        ConfigKey::ContactRateLimitWindowSecs,
        ConfigKey::ContactWebhookUrl,
    ];

    /// Environment variable backing this key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigKey::Environment => APP_ENV_ENV,
            ConfigKey::AccessToken => ACCESS_TOKEN_ENV,
            ConfigKey::ApiBaseUrl => API_BASE_URL_ENV,
            ConfigKey::Host => HOST_ENV,
            ConfigKey::Port => PORT_ENV,
            ConfigKey::LogFormat => LOG_FORMAT_ENV,
            ConfigKey::TlsCertPath => TLS_CERT_PATH_ENV,
            ConfigKey::TlsKeyPath => TLS_KEY_PATH_ENV,
            ConfigKey::ContactRateLimitMax => CONTACT_RATE_LIMIT_MAX_ENV,
            ConfigKey::ContactRateLimitWindowSecs => CONTACT_RATE_LIMIT_WINDOW_SECS_ENV,
            ConfigKey::ContactWebhookUrl => CONTACT_WEBHOOK_URL_ENV,
        }
    }
}

/// Source of raw configuration values.
pub trait ConfigProvider {
    /// Raw value for `key`, or `None` when unset.
    fn get(&self, key: ConfigKey) -> Option<String>;
}

/// Reads configuration from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvConfigProvider;

impl ConfigProvider for EnvConfigProvider {
    fn get(&self, key: ConfigKey) -> Option<String> {
        std::env::var(key.env_var()).ok()
    }
}

/// Fixed set of values, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapConfigProvider {
    values: HashMap<ConfigKey, String>,
}

impl MapConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }
}

impl ConfigProvider for MapConfigProvider {
    fn get(&self, key: ConfigKey) -> Option<String> {
        self.values.get(&key).cloned()
    }
}

/// Contact endpoint rate-limit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,
    pub capacity: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_CONTACT_RATE_LIMIT_MAX,
            window: Duration::from_secs(DEFAULT_CONTACT_RATE_LIMIT_WINDOW_SECS),
            capacity: CONTACT_RATE_LIMIT_CAPACITY,
        }
    }
}

/// TLS material locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Resolved, immutable service configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    /// Expected gate token. `None` means "not configured".
    pub expected_token: Option<String>,
    pub api_base_url: Url,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub tls: Option<TlsPaths>,
    pub contact_rate_limit: RateLimitSettings,
    pub contact_webhook_url: Option<Url>,
}

impl Settings {
    /// Resolve settings from a provider, applying defaults.
    pub fn resolve(provider: &impl ConfigProvider) -> Result<Self, ConfigError> {
        let value = |key: ConfigKey| {
            provider
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = match value(ConfigKey::Environment) {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        // An empty secret is the same as no secret: it must not unlock the gate.
        let expected_token = provider
            .get(ConfigKey::AccessToken)
            .filter(|token| !token.is_empty());

        let api_base_url = parse_url(
            API_BASE_URL_ENV,
            value(ConfigKey::ApiBaseUrl).as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )?;

        let host = value(ConfigKey::Host).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match value(ConfigKey::Port) {
            Some(raw) => parse_number(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };

        let log_format = match value(ConfigKey::LogFormat).as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let tls = match (value(ConfigKey::TlsCertPath), value(ConfigKey::TlsKeyPath)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let max_requests = match value(ConfigKey::ContactRateLimitMax) {
            Some(raw) => parse_number(CONTACT_RATE_LIMIT_MAX_ENV, &raw)?,
            None => DEFAULT_CONTACT_RATE_LIMIT_MAX,
        };
        if max_requests == 0 {
            return Err(ConfigError::ZeroValue(CONTACT_RATE_LIMIT_MAX_ENV));
        }

        let window_secs: u64 = match value(ConfigKey::ContactRateLimitWindowSecs) {
            Some(raw) => parse_number(CONTACT_RATE_LIMIT_WINDOW_SECS_ENV, &raw)?,
            None => DEFAULT_CONTACT_RATE_LIMIT_WINDOW_SECS,
        };
        if window_secs == 0 {
            return Err(ConfigError::ZeroValue(CONTACT_RATE_LIMIT_WINDOW_SECS_ENV));
        }

        let contact_webhook_url = value(ConfigKey::ContactWebhookUrl)
            .map(|raw| parse_url(CONTACT_WEBHOOK_URL_ENV, &raw))
            .transpose()?;

        Ok(Self {
            environment,
            expected_token,
            api_base_url,
            host,
            port,
            log_format,
            tls,
            contact_rate_limit: RateLimitSettings {
                max_requests,
                window: Duration::from_secs(window_secs),
                capacity: CONTACT_RATE_LIMIT_CAPACITY,
            },
            contact_webhook_url,
        })
    }

    /// Settings for the given tier and secret with every other value defaulted.
    pub fn for_environment(environment: Environment, expected_token: Option<&str>) -> Self {
        let mut provider =
            MapConfigProvider::new().with(ConfigKey::Environment, environment.as_str());
        if let Some(token) = expected_token {
            provider = provider.with(ConfigKey::AccessToken, token);
        }
        // Defaults are always valid.
        match Self::resolve(&provider) {
            Ok(settings) => settings,
            Err(e) => unreachable!("default settings failed to resolve: {e}"),
        }
    }

    /// Whether the gate can actually grant access in this deployment.
    pub fn gate_configured(&self) -> bool {
        !self.environment.requires_token() || self.expected_token.is_some()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_environment(Environment::default(), None)
    }
}

fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: raw.to_string(),
    })
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        key,
        reason: e.to_string(),
    })
}
