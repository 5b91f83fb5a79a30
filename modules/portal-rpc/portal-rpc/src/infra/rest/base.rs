use portal_http::{HttpClient, HttpError, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::options::ServiceOptions;
use crate::domain::error::ServiceError;

/// Successful backend answer, passed on unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub data: Value,
}

/// Shared request plumbing for the three service clients.
pub(super) struct RestClient {
    options: ServiceOptions,
}

impl RestClient {
    pub(super) fn new(options: ServiceOptions) -> Self {
        Self { options }
    }

    pub(super) fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// In mock mode no backend is called and there are no canned answers.
    pub(super) fn ensure_live(&self, operation: &'static str) -> Result<(), ServiceError> {
        if self.options.mock_enabled {
            tracing::info!(
                operation,
                context = %self.options.context,
                "mock mode enabled; no mock response available"
            );
            return Err(ServiceError::MockNotImplemented { operation });
        }
        Ok(())
    }

    /// Base URL + context prefix + `segments`, each segment percent-encoded.
    ///
    /// Segments that URL normalization would drop or resolve (`""`, `.`,
    /// `..`) are refused rather than sent to a different endpoint.
    pub(super) fn endpoint(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<Url, ServiceError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ServiceError::InvalidPathSegment {
                segment: (*bad).to_owned(),
            });
        }

        let base = &self.options.base_url;
        let mut url = Url::parse(base).map_err(|e| ServiceError::InvalidBaseUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidBaseUrl {
                url: base.clone(),
                reason: "cannot be a base".to_owned(),
            })?
            .pop_if_empty()
            .extend(self.options.prefix().split('/').filter(|s| !s.is_empty()))
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub(super) async fn get(
        &self,
        operation: &'static str,
        url: Url,
    ) -> Result<ServiceResponse, ServiceError> {
        let http = self.http()?;
        let request = http.get(url.as_str());
        self.execute(operation, &url, request).await
    }

    pub(super) async fn post_json<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        url: Url,
        body: &B,
    ) -> Result<ServiceResponse, ServiceError> {
        let http = self.http()?;
        let request = http.post(url.as_str()).json(body)?;
        self.execute(operation, &url, request).await
    }

    fn http(&self) -> Result<HttpClient, ServiceError> {
        Ok(HttpClient::builder()
            .timeout(self.options.timeout)
            .transport(self.options.transport)
            .build()?)
    }

    async fn execute(
        &self,
        operation: &'static str,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<ServiceResponse, ServiceError> {
        let mut request = request
            .header("x-portal-login", &self.options.caller_id)
            .header("accept", "application/json");
        if let Some(token) = &self.options.bearer_token {
            request = request.bearer_auth(token.expose());
        }

        tracing::debug!(operation, path = url.path(), "calling backend");

        let result: Result<Value, HttpError> =
            async { request.send().await?.json().await }.await;
        match result {
            Ok(data) => Ok(ServiceResponse { data }),
            Err(e) => {
                tracing::warn!(operation, path = url.path(), error = %e, "backend call failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use portal_rpc_sdk::Context;

    fn client(base_url: &str, context: Context) -> RestClient {
        let mut options = ServiceOptions::new(context, "jdoe");
        options.base_url = base_url.to_owned();
        RestClient::new(options)
    }

    #[test]
    fn endpoint_appends_prefix_and_segments() {
        let url = client("https://api.example.com", Context::Employer)
            .endpoint(&["members", "byMemberId", "42"], &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/employer/v1/members/byMemberId/42"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = client("https://gw.example.com/portal/", Context::Common)
            .endpoint(&["members", "search"], &[])
            .unwrap();
        assert_eq!(url.path(), "/portal/api/v1/members/search");
    }

    #[test]
    fn endpoint_encodes_slashes_inside_segments() {
        let url = client("https://api.example.com", Context::Common)
            .endpoint(&["members", "byLoginId", "a/b c"], &[])
            .unwrap();
        assert_eq!(url.path(), "/api/v1/members/byLoginId/a%2Fb%20c");
    }

    #[test]
    fn endpoint_refuses_dot_segments() {
        let c = client("https://api.example.com", Context::Common);
        for id in [".", "..", ""] {
            let err = c
                .endpoint(&["members", "byMemberId", id, "claims", "C-1"], &[])
                .unwrap_err();
            assert!(
                matches!(&err, ServiceError::InvalidPathSegment { segment } if segment == id),
                "{id:?}: {err:?}"
            );
        }

        let url = c
            .endpoint(&["members", "byMemberId", "...", "claims", "C-1"], &[])
            .unwrap();
        assert_eq!(url.path(), "/api/v1/members/byMemberId/.../claims/C-1");
    }

    #[test]
    fn endpoint_adds_query_only_when_present() {
        let c = client("https://api.example.com", Context::Common);
        let bare = c.endpoint(&["x"], &[]).unwrap();
        assert_eq!(bare.query(), None);

        let with = c
            .endpoint(&["x"], &[("asOfDate", "2024-06-01".to_owned())])
            .unwrap();
        assert_eq!(with.query(), Some("asOfDate=2024-06-01"));
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let err = client("not a url", Context::Common)
            .endpoint(&["members"], &[])
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn mock_mode_short_circuits() {
        let mut options = ServiceOptions::new(Context::Common, "jdoe");
        options.mock_enabled = true;
        let err = RestClient::new(options).ensure_live("MemberService.getMember").unwrap_err();
        assert!(matches!(
            err,
            ServiceError::MockNotImplemented { operation: "MemberService.getMember" }
        ));
    }
}
