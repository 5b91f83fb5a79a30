//! Typed procedure surface of the gateway.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::ProcedureError;
use crate::inputs::{
    BenefitDetailsInput, ClaimByIdInput, ClaimLineItemsInput, ClaimsSearchInput,
    EligibilityInput, MemberLookupInput, MemberSearchInput,
};
use crate::models::{BenefitDetails, Claim, ClaimLineItem, Eligibility, Member, MemberPage};

/// One method per procedure. Inputs are already validated; outputs are
/// validated before they are returned.
///
/// ```ignore
/// let ctx = RequestContext::new("jdoe")?;
/// let input = MemberLookupInput::new(LookupKey::ByMemberId, "12345", Context::Employer);
/// let member = portal.get_member(&ctx, input).await?;
/// ```
#[async_trait]
pub trait PortalRpcClient: Send + Sync {
    /// `member.get`
    async fn get_member(
        &self,
        ctx: &RequestContext,
        input: MemberLookupInput,
    ) -> Result<Member, ProcedureError>;

    /// `member.getExtended`
    async fn get_member_extended(
        &self,
        ctx: &RequestContext,
        input: MemberLookupInput,
    ) -> Result<Member, ProcedureError>;

    /// `member.search`; pagination is synthesized from the input.
    async fn search_members(
        &self,
        ctx: &RequestContext,
        input: MemberSearchInput,
    ) -> Result<MemberPage, ProcedureError>;

    /// `member.getEligibility`
    async fn get_eligibility(
        &self,
        ctx: &RequestContext,
        input: EligibilityInput,
    ) -> Result<Eligibility, ProcedureError>;

    /// `claims.search`
    async fn search_claims(
        &self,
        ctx: &RequestContext,
        input: ClaimsSearchInput,
    ) -> Result<Vec<Claim>, ProcedureError>;

    /// `claims.getById`
    async fn get_claim(
        &self,
        ctx: &RequestContext,
        input: ClaimByIdInput,
    ) -> Result<Claim, ProcedureError>;

    /// `claims.getLineItems`
    async fn get_claim_line_items(
        &self,
        ctx: &RequestContext,
        input: ClaimLineItemsInput,
    ) -> Result<Vec<ClaimLineItem>, ProcedureError>;

    /// `benefits.getDetails`
    async fn get_benefit_details(
        &self,
        ctx: &RequestContext,
        input: BenefitDetailsInput,
    ) -> Result<BenefitDetails, ProcedureError>;
}
