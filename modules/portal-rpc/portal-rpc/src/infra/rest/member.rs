use portal_rpc_sdk::{LookupKey, MemberSearchFilters};
use tracing::instrument;

use super::base::{RestClient, ServiceResponse};
use super::options::ServiceOptions;
use crate::domain::error::ServiceError;

/// Client for the member backend.
pub struct MemberServiceClient {
    rest: RestClient,
}

impl MemberServiceClient {
    #[must_use]
    pub fn new(options: ServiceOptions) -> Self {
        Self {
            rest: RestClient::new(options),
        }
    }

    /// # Errors
    /// `MockNotImplemented` in mock mode, otherwise the raw backend failure.
    #[instrument(skip_all, fields(context = %self.rest.options().context, lookup = %lookup))]
    pub async fn get_member(
        &self,
        lookup: LookupKey,
        member_id: &str,
    ) -> Result<ServiceResponse, ServiceError> {
        const OPERATION: &str = "MemberService.getMember";
        self.rest.ensure_live(OPERATION)?;
        let url = self
            .rest
            .endpoint(&["members", lookup.as_str(), member_id], &[])?;
        self.rest.get(OPERATION, url).await
    }

    /// Same record as [`Self::get_member`] from the `/data` endpoint.
    ///
    /// # Errors
    /// `MockNotImplemented` in mock mode, otherwise the raw backend failure.
    #[instrument(skip_all, fields(context = %self.rest.options().context, lookup = %lookup))]
    pub async fn get_member_extended(
        &self,
        lookup: LookupKey,
        member_id: &str,
    ) -> Result<ServiceResponse, ServiceError> {
        const OPERATION: &str = "MemberService.getMemberExtended";
        self.rest.ensure_live(OPERATION)?;
        let url = self
            .rest
            .endpoint(&["members", lookup.as_str(), member_id, "data"], &[])?;
        self.rest.get(OPERATION, url).await
    }

    /// # Errors
    /// `MockNotImplemented` in mock mode, otherwise the raw backend failure.
    #[instrument(skip_all, fields(context = %self.rest.options().context))]
    pub async fn search_members(
        &self,
        filters: &MemberSearchFilters,
    ) -> Result<ServiceResponse, ServiceError> {
        const OPERATION: &str = "MemberService.searchMembers";
        self.rest.ensure_live(OPERATION)?;
        let url = self.rest.endpoint(&["members", "search"], &[])?;
        self.rest.post_json(OPERATION, url, filters).await
    }

    /// # Errors
    /// `MockNotImplemented` in mock mode, otherwise the raw backend failure.
    #[instrument(skip_all, fields(context = %self.rest.options().context, lookup = %lookup))]
    pub async fn get_eligibility(
        &self,
        lookup: LookupKey,
        member_id: &str,
        as_of_date: Option<&str>,
    ) -> Result<ServiceResponse, ServiceError> {
        const OPERATION: &str = "MemberService.getEligibility";
        self.rest.ensure_live(OPERATION)?;
        let query: Vec<_> = as_of_date
            .map(|d| ("asOfDate", d.to_owned()))
            .into_iter()
            .collect();
        let url = self
            .rest
            .endpoint(&["members", lookup.as_str(), member_id, "eligibility"], &query)?;
        self.rest.get(OPERATION, url).await
    }
}
