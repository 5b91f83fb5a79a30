//! REST clients for the member, claims and benefits backends.

mod base;
pub mod benefits;
pub mod claims;
pub mod member;
pub mod options;

pub use base::ServiceResponse;
pub use benefits::{BenefitsServiceClient, benefit_query};
pub use claims::{ClaimSearchParams, ClaimsServiceClient};
pub use member::MemberServiceClient;
pub use options::{DEFAULT_PREFIX, ServiceOptions, path_prefix, path_prefix_for};
