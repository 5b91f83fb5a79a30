//! Request context resolution from inbound headers.

use http::HeaderMap;
use http::header::AUTHORIZATION;
use portal_rpc_sdk::{BearerToken, ProcedureError, RequestContext};

use crate::config::PortalConfig;

/// Build the per-request context from headers and module configuration.
///
/// # Errors
/// `ProcedureError::Unauthorized` when the caller header is missing, blank or
/// not valid UTF-8.
pub fn resolve(headers: &HeaderMap, config: &PortalConfig) -> Result<RequestContext, ProcedureError> {
    let Some(caller_id) = headers
        .get(config.caller_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    else {
        tracing::debug!(header = %config.caller_header, "caller identity header missing");
        return Err(ProcedureError::Unauthorized);
    };

    let bearer_token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token)
        .map(BearerToken::new);

    Ok(RequestContext::new(caller_id)?
        .with_bearer_token(bearer_token)
        .with_base_url(config.effective_base_url())
        .with_mock_enabled(config.mock_enabled())
        .with_timeout(config.timeout())
        .with_insecure_http(config.allow_insecure_http))
}

/// Strip a leading `Bearer ` if present; anything else is taken verbatim.
fn extract_bearer_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}
