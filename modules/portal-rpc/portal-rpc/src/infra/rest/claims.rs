use portal_rpc_sdk::LookupKey;
use tracing::instrument;

use super::base::{RestClient, ServiceResponse};
use super::options::ServiceOptions;
use crate::domain::error::ServiceError;

/// Query window for a claims search. Dates are `MM-DD-YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimSearchParams<'a> {
    pub from_date: &'a str,
    pub to_date: &'a str,
    pub claim_type: Option<&'a str>,
    pub max_result: u32,
}

impl ClaimSearchParams<'_> {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("fromDate", self.from_date.to_owned()),
            ("toDate", self.to_date.to_owned()),
        ];
        if let Some(claim_type) = self.claim_type {
            query.push(("claimType", claim_type.to_owned()));
        }
        query.push(("maxResult", self.max_result.to_string()));
        query
    }
}

/// Client for the claims backend.
pub struct ClaimsServiceClient {
    rest: RestClient,
}

impl ClaimsServiceClient {
    #[must_use]
    pub fn new(options: ServiceOptions) -> Self {
        Self {
            rest: RestClient::new(options),
        }
    }

    /// # Errors
    /// `MockNotImplemented` in mock mode, otherwise the raw backend failure.
    #[instrument(skip_all, fields(context = %self.rest.options().context, lookup = %lookup))]
    pub async fn search_claims(
        &self,
        lookup: LookupKey,
        member_id: &str,
        params: ClaimSearchParams<'_>,
    ) -> Result<ServiceResponse, ServiceError> {
        const OPERATION: &str = "ClaimsService.searchClaims";
        self.rest.ensure_live(OPERATION)?;
        let url = self.rest.endpoint(
            &["members", lookup.as_str(), member_id, "claims"],
            &params.query(),
        )?;
        self.rest.get(OPERATION, url).await
    }

    /// # Errors
    /// `MockNotImplemented` in mock mode, otherwise the raw backend failure.
    #[instrument(skip_all, fields(context = %self.rest.options().context, claim_id = %claim_id))]
    pub async fn get_claim(
        &self,
        lookup: LookupKey,
        member_id: &str,
        claim_id: &str,
    ) -> Result<ServiceResponse, ServiceError> {
        const OPERATION: &str = "ClaimsService.getClaim";
        self.rest.ensure_live(OPERATION)?;
        let url = self.rest.endpoint(
            &["members", lookup.as_str(), member_id, "claims", claim_id],
            &[],
        )?;
        self.rest.get(OPERATION, url).await
    }

    /// # Errors
    /// `MockNotImplemented` in mock mode, otherwise the raw backend failure.
    #[instrument(skip_all, fields(context = %self.rest.options().context, claim_id = %claim_id))]
    pub async fn get_claim_line_items(
        &self,
        lookup: LookupKey,
        member_id: &str,
        claim_type: &str,
        claim_id: &str,
    ) -> Result<ServiceResponse, ServiceError> {
        const OPERATION: &str = "ClaimsService.getClaimLineItems";
        self.rest.ensure_live(OPERATION)?;
        let url = self.rest.endpoint(
            &[
                "members",
                lookup.as_str(),
                member_id,
                "claims",
                claim_type,
                claim_id,
                "lines",
            ],
            &[],
        )?;
        self.rest.get(OPERATION, url).await
    }
}
