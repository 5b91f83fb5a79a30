//! Portal RPC SDK
//!
//! Public surface of the portal gateway:
//!
//! - [`PortalRpcClient`] - one typed method per procedure
//! - [`RequestContext`] - resolved caller identity and backend settings
//! - [`models`] - backend snapshots (Member, Claim, `BenefitDetails`, ...)
//! - [`inputs`] - procedure inputs
//! - [`schema`] - validation of untyped JSON into models and inputs
//! - [`ProcedureError`] - uniform failure with a stable `code()`
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod context;
pub mod error;
pub mod inputs;
pub mod models;
pub mod schema;

pub use api::PortalRpcClient;
pub use context::{BearerToken, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, RequestContext};
pub use error::{BoxError, ProcedureError, ValidationStage};
pub use inputs::{
    BenefitDetailsInput, ClaimByIdInput, ClaimLineItemsInput, ClaimsSearchInput,
    EligibilityInput, MemberLookupInput, MemberSearchFilters, MemberSearchInput,
};
pub use models::{
    BenefitDetail, BenefitDetails, BenefitRequestOptions, BenefitSummary, Claim, ClaimLineItem,
    Context, Coverage, Eligibility, LookupKey, Member, MemberPage, Pagination, ProductType,
    ServiceClass,
};
pub use schema::{Schema, parse_list};
