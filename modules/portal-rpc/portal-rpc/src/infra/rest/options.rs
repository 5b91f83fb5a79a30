use std::time::Duration;

use portal_http::TransportSecurity;
use portal_rpc_sdk::{BearerToken, Context, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, RequestContext};

/// Prefix for `common` and for any context the table does not know.
pub const DEFAULT_PREFIX: &str = "/api/v1";

const CONTEXT_PREFIXES: &[(&str, &str)] = &[
    ("employer", "/api/employer/v1"),
    ("broker", "/api/broker/v1"),
    ("internal", "/api/internal/v1"),
    ("common", DEFAULT_PREFIX),
];

/// Path prefix for a raw context name. Never fails.
#[must_use]
pub fn path_prefix_for(context: &str) -> &'static str {
    CONTEXT_PREFIXES
        .iter()
        .find(|(name, _)| *name == context)
        .map_or(DEFAULT_PREFIX, |(_, prefix)| *prefix)
}

#[must_use]
pub fn path_prefix(context: Context) -> &'static str {
    path_prefix_for(context.as_str())
}

/// Settings for one service client instance.
///
/// Built once per procedure call and dropped with the client. `Debug` never
/// shows the bearer token.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub base_url: String,
    pub context: Context,
    pub caller_id: String,
    pub bearer_token: Option<BearerToken>,
    pub timeout: Duration,
    pub mock_enabled: bool,
    pub transport: TransportSecurity,
}

impl ServiceOptions {
    #[must_use]
    pub fn new(context: Context, caller_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            context,
            caller_id: caller_id.into(),
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
            mock_enabled: false,
            transport: TransportSecurity::TlsOnly,
        }
    }

    /// Options for a call made on behalf of `ctx`, scoped to `context`.
    #[must_use]
    pub fn from_context(ctx: &RequestContext, context: Context) -> Self {
        Self {
            base_url: ctx.base_url().to_owned(),
            context,
            caller_id: ctx.caller_id().to_owned(),
            bearer_token: ctx.bearer_token().cloned(),
            timeout: ctx.timeout(),
            mock_enabled: ctx.mock_enabled(),
            transport: if ctx.allow_insecure_http() {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &'static str {
        path_prefix(self.context)
    }
}
