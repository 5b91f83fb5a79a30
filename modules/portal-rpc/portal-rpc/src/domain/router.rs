//! Procedure router: typed procedures over the domain service clients.

use async_trait::async_trait;
use http::HeaderMap;
use portal_errors::ValidationViolation;
use portal_rpc_sdk::{
    BenefitDetails, BenefitDetailsInput, Claim, ClaimByIdInput, ClaimLineItem,
    ClaimLineItemsInput, ClaimsSearchInput, Eligibility, EligibilityInput, Member,
    MemberLookupInput, MemberPage, MemberSearchInput, Pagination, PortalRpcClient,
    ProcedureError, RequestContext, Schema, parse_list,
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::context;
use super::error::ServiceError;
use super::procedure::Procedure;
use crate::config::PortalConfig;
use crate::infra::rest::{
    BenefitsServiceClient, ClaimSearchParams, ClaimsServiceClient, MemberServiceClient,
    ServiceOptions, ServiceResponse,
};

/// Entry point for every procedure.
///
/// Holds only configuration; each call builds its own service client from
/// the caller's [`RequestContext`].
#[derive(Debug, Clone, Default)]
pub struct PortalRouter {
    config: PortalConfig,
}

impl PortalRouter {
    #[must_use]
    pub fn new(config: PortalConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Run `procedure` with untyped JSON input.
    ///
    /// The caller context is resolved before the input is looked at, so an
    /// anonymous call fails `Unauthorized` whatever its input.
    ///
    /// # Errors
    /// Any [`ProcedureError`].
    #[instrument(skip_all, fields(procedure = %procedure))]
    pub async fn dispatch(
        &self,
        procedure: Procedure,
        headers: &HeaderMap,
        input: &Value,
    ) -> Result<Value, ProcedureError> {
        let ctx = context::resolve(headers, &self.config)?;
        match procedure {
            Procedure::MemberGet => to_wire(self.get_member(&ctx, parse_input(input)?).await),
            Procedure::MemberGetExtended => {
                to_wire(self.get_member_extended(&ctx, parse_input(input)?).await)
            }
            Procedure::MemberSearch => {
                to_wire(self.search_members(&ctx, parse_input(input)?).await)
            }
            Procedure::MemberGetEligibility => {
                to_wire(self.get_eligibility(&ctx, parse_input(input)?).await)
            }
            Procedure::ClaimsSearch => to_wire(self.search_claims(&ctx, parse_input(input)?).await),
            Procedure::ClaimsGetById => to_wire(self.get_claim(&ctx, parse_input(input)?).await),
            Procedure::ClaimsGetLineItems => {
                to_wire(self.get_claim_line_items(&ctx, parse_input(input)?).await)
            }
            Procedure::BenefitsGetDetails => {
                to_wire(self.get_benefit_details(&ctx, parse_input(input)?).await)
            }
        }
    }
}

fn parse_input<T: Schema>(input: &Value) -> Result<T, ProcedureError> {
    T::parse(input).map_err(|violations| {
        tracing::debug!(count = violations.len(), "input rejected");
        ProcedureError::input(violations)
    })
}

fn settle(
    procedure: Procedure,
    result: Result<ServiceResponse, ServiceError>,
) -> Result<Value, ProcedureError> {
    result
        .map(|response| response.data)
        .map_err(|e| procedure.translate(e))
}

fn parse_output<T: Schema>(procedure: Procedure, data: &Value) -> Result<T, ProcedureError> {
    T::parse(data).map_err(|violations| output_rejected(procedure, violations))
}

fn parse_output_list<T: Schema>(
    procedure: Procedure,
    data: &Value,
) -> Result<Vec<T>, ProcedureError> {
    parse_list(data).map_err(|violations| output_rejected(procedure, violations))
}

fn output_rejected(
    procedure: Procedure,
    violations: Vec<ValidationViolation>,
) -> ProcedureError {
    tracing::warn!(
        procedure = procedure.name(),
        count = violations.len(),
        "backend payload failed output validation"
    );
    ProcedureError::output(violations)
}

fn to_wire<T: Serialize>(result: Result<T, ProcedureError>) -> Result<Value, ProcedureError> {
    serde_json::to_value(result?).map_err(|e| ProcedureError::Internal {
        message: "failed to encode output".to_owned(),
        source: Box::new(e),
    })
}

fn member_client(ctx: &RequestContext, input: &MemberLookupInput) -> MemberServiceClient {
    MemberServiceClient::new(ServiceOptions::from_context(ctx, input.context))
}

fn claims_client(ctx: &RequestContext, input: &MemberLookupInput) -> ClaimsServiceClient {
    ClaimsServiceClient::new(ServiceOptions::from_context(ctx, input.context))
}

#[async_trait]
impl PortalRpcClient for PortalRouter {
    #[instrument(skip_all, fields(procedure = "member.get", lookup = %input.lookup))]
    async fn get_member(
        &self,
        ctx: &RequestContext,
        input: MemberLookupInput,
    ) -> Result<Member, ProcedureError> {
        let procedure = Procedure::MemberGet;
        let result = member_client(ctx, &input)
            .get_member(input.lookup, &input.member_id)
            .await;
        parse_output(procedure, &settle(procedure, result)?)
    }

    #[instrument(skip_all, fields(procedure = "member.getExtended", lookup = %input.lookup))]
    async fn get_member_extended(
        &self,
        ctx: &RequestContext,
        input: MemberLookupInput,
    ) -> Result<Member, ProcedureError> {
        let procedure = Procedure::MemberGetExtended;
        let result = member_client(ctx, &input)
            .get_member_extended(input.lookup, &input.member_id)
            .await;
        parse_output(procedure, &settle(procedure, result)?)
    }

    #[instrument(skip_all, fields(procedure = "member.search", page = input.page, page_size = input.page_size))]
    async fn search_members(
        &self,
        ctx: &RequestContext,
        input: MemberSearchInput,
    ) -> Result<MemberPage, ProcedureError> {
        let procedure = Procedure::MemberSearch;
        let result = MemberServiceClient::new(ServiceOptions::from_context(ctx, input.context))
            .search_members(&input.filters)
            .await;
        let data: Vec<Member> = parse_output_list(procedure, &settle(procedure, result)?)?;
        let pagination = Pagination::single_page(input.page, input.page_size, data.len());
        Ok(MemberPage { data, pagination })
    }

    #[instrument(skip_all, fields(procedure = "member.getEligibility", lookup = %input.member.lookup))]
    async fn get_eligibility(
        &self,
        ctx: &RequestContext,
        input: EligibilityInput,
    ) -> Result<Eligibility, ProcedureError> {
        let procedure = Procedure::MemberGetEligibility;
        let member = &input.member;
        let result = member_client(ctx, member)
            .get_eligibility(member.lookup, &member.member_id, input.as_of_date.as_deref())
            .await;
        parse_output(procedure, &settle(procedure, result)?)
    }

    #[instrument(skip_all, fields(procedure = "claims.search", lookup = %input.member.lookup))]
    async fn search_claims(
        &self,
        ctx: &RequestContext,
        input: ClaimsSearchInput,
    ) -> Result<Vec<Claim>, ProcedureError> {
        let procedure = Procedure::ClaimsSearch;
        let member = &input.member;
        let params = ClaimSearchParams {
            from_date: &input.from_date,
            to_date: &input.to_date,
            claim_type: input.claim_type.as_deref(),
            max_result: input.max_result,
        };
        let result = claims_client(ctx, member)
            .search_claims(member.lookup, &member.member_id, params)
            .await;
        parse_output_list(procedure, &settle(procedure, result)?)
    }

    #[instrument(skip_all, fields(procedure = "claims.getById", claim_id = %input.claim_id))]
    async fn get_claim(
        &self,
        ctx: &RequestContext,
        input: ClaimByIdInput,
    ) -> Result<Claim, ProcedureError> {
        let procedure = Procedure::ClaimsGetById;
        let member = &input.member;
        let result = claims_client(ctx, member)
            .get_claim(member.lookup, &member.member_id, &input.claim_id)
            .await;
        parse_output(procedure, &settle(procedure, result)?)
    }

    #[instrument(skip_all, fields(procedure = "claims.getLineItems", claim_id = %input.claim_id))]
    async fn get_claim_line_items(
        &self,
        ctx: &RequestContext,
        input: ClaimLineItemsInput,
    ) -> Result<Vec<ClaimLineItem>, ProcedureError> {
        let procedure = Procedure::ClaimsGetLineItems;
        let member = &input.member;
        let result = claims_client(ctx, member)
            .get_claim_line_items(
                member.lookup,
                &member.member_id,
                &input.claim_type,
                &input.claim_id,
            )
            .await;
        parse_output_list(procedure, &settle(procedure, result)?)
    }

    #[instrument(skip_all, fields(procedure = "benefits.getDetails", plan_id = %input.plan_id))]
    async fn get_benefit_details(
        &self,
        ctx: &RequestContext,
        input: BenefitDetailsInput,
    ) -> Result<BenefitDetails, ProcedureError> {
        let procedure = Procedure::BenefitsGetDetails;
        let member = &input.member;
        let result = BenefitsServiceClient::new(ServiceOptions::from_context(ctx, member.context))
            .get_benefit_details(
                member.lookup,
                &member.member_id,
                input.product_type,
                &input.plan_id,
                input.options.as_ref(),
            )
            .await;
        parse_output(procedure, &settle(procedure, result)?)
    }
}
