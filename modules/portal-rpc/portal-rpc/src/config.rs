//! Configuration for the portal gateway module.

use std::time::Duration;

use http::HeaderName;
use portal_rpc_sdk::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Header carrying the caller identity unless configured otherwise.
pub const DEFAULT_CALLER_HEADER: &str = "x-portal-login";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base_url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("caller_header '{0}' is not a valid header name")]
    InvalidCallerHeader(String),

    #[error("timeout_ms must be greater than zero")]
    ZeroTimeout,
}

/// Deployment environment. Mock mode defaults to on only in `development`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

/// Module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    /// Backend root; context path prefixes are appended to it.
    pub base_url: String,

    pub environment: Environment,

    /// Explicit mock switch. When unset, mock mode follows `environment`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_enabled: Option<bool>,

    /// Per-call backend timeout in milliseconds.
    pub timeout_ms: u64,

    /// Accept `http://` base URLs. Only meant for local mock backends.
    pub allow_insecure_http: bool,

    /// Request header the caller identity is read from.
    pub caller_header: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            environment: Environment::default(),
            mock_enabled: None,
            timeout_ms: 30_000,
            allow_insecure_http: false,
            caller_header: DEFAULT_CALLER_HEADER.to_owned(),
        }
    }
}

impl PortalConfig {
    /// Effective mock switch: the override if set, else `environment == development`.
    #[must_use]
    pub fn mock_enabled(&self) -> bool {
        self.mock_enabled
            .unwrap_or(self.environment == Environment::Development)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Configured base URL, or the production default when blank.
    #[must_use]
    pub fn effective_base_url(&self) -> &str {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            DEFAULT_BASE_URL
        } else {
            trimmed
        }
    }

    /// Reject settings that would fail on every call.
    ///
    /// # Errors
    /// The first problem found, as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let raw = self.effective_base_url();
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "https" => {}
            "http" => {
                if !self.allow_insecure_http {
                    return Err(ConfigError::InvalidBaseUrl {
                        url: raw.to_owned(),
                        reason: "http requires allow_insecure_http".to_owned(),
                    });
                }
            }
            other => {
                return Err(ConfigError::InvalidBaseUrl {
                    url: raw.to_owned(),
                    reason: format!("unsupported scheme '{other}'"),
                });
            }
        }
        if HeaderName::from_bytes(self.caller_header.as_bytes()).is_err() {
            return Err(ConfigError::InvalidCallerHeader(self.caller_header.clone()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
