//! Per-request caller context.

use std::fmt;
use std::time::Duration;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ProcedureError;

/// Production backend used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.memberportal.com";

/// Default per-call backend timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Bearer credential forwarded to the backend.
///
/// `Debug` and `Display` print `[REDACTED]`; the buffer is zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token for building the `Authorization` header. Never log it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Resolved caller context for one procedure call.
///
/// Can only be built with a non-blank caller identity, so holding one is the
/// auth gate.
#[derive(Debug, Clone)]
pub struct RequestContext {
    caller_id: String,
    bearer_token: Option<BearerToken>,
    base_url: String,
    mock_enabled: bool,
    timeout: Duration,
    allow_insecure_http: bool,
}

impl RequestContext {
    /// # Errors
    /// `ProcedureError::Unauthorized` when `caller_id` is blank.
    pub fn new(caller_id: impl Into<String>) -> Result<Self, ProcedureError> {
        let caller_id = caller_id.into().trim().to_owned();
        if caller_id.is_empty() {
            return Err(ProcedureError::Unauthorized);
        }
        Ok(Self {
            caller_id,
            bearer_token: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            mock_enabled: false,
            timeout: DEFAULT_TIMEOUT,
            allow_insecure_http: false,
        })
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: Option<BearerToken>) -> Self {
        self.bearer_token = token;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_mock_enabled(mut self, enabled: bool) -> Self {
        self.mock_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Allow `http://` base URLs (local mock backends).
    #[must_use]
    pub fn with_insecure_http(mut self, allow: bool) -> Self {
        self.allow_insecure_http = allow;
        self
    }

    #[must_use]
    pub fn caller_id(&self) -> &str {
        &self.caller_id
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&BearerToken> {
        self.bearer_token.as_ref()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn mock_enabled(&self) -> bool {
        self.mock_enabled
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn allow_insecure_http(&self) -> bool {
        self.allow_insecure_http
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn blank_caller_is_unauthorized() {
        assert!(matches!(
            RequestContext::new("   "),
            Err(ProcedureError::Unauthorized)
        ));
    }

    #[test]
    fn defaults_point_at_production() {
        let ctx = RequestContext::new("jdoe").unwrap();
        assert_eq!(ctx.caller_id(), "jdoe");
        assert_eq!(ctx.base_url(), DEFAULT_BASE_URL);
        assert_eq!(ctx.timeout(), Duration::from_millis(30_000));
        assert!(!ctx.mock_enabled());
        assert!(ctx.bearer_token().is_none());
    }

    #[test]
    fn token_never_appears_in_debug() {
        let ctx = RequestContext::new("jdoe")
            .unwrap()
            .with_bearer_token(Some(BearerToken::new("tok-secret-123")));
        let dbg = format!("{ctx:?}");
        assert!(!dbg.contains("tok-secret-123"));
        assert!(dbg.contains("[REDACTED]"));
        assert_eq!(ctx.bearer_token().map(BearerToken::expose), Some("tok-secret-123"));
    }
}
