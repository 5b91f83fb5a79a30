//! Procedure inputs.
//!
//! Each input is validated once at the RPC boundary via [`Schema`]. An absent
//! `context` means `common`; an unknown one is a violation.

use serde::Serialize;
use serde_json::Value;

use crate::models::{BenefitRequestOptions, Context, LookupKey, ProductType};
use crate::schema::{Fields, Schema, Violations};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_RESULT: u32 = 100;
pub const MAX_RESULT_LIMIT: u32 = 500;

/// Shared member address: which key, which id, which context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLookupInput {
    pub lookup: LookupKey,
    pub member_id: String,
    pub context: Context,
}

impl MemberLookupInput {
    pub fn new(lookup: LookupKey, member_id: impl Into<String>, context: Context) -> Self {
        Self {
            lookup,
            member_id: member_id.into(),
            context,
        }
    }

    /// Read the three lookup fields into `f`. Used by every member-scoped input.
    fn read(f: &mut Fields<'_>) -> (Option<LookupKey>, Option<String>, Option<Context>) {
        let lookup = f.required_enum("lookup", LookupKey::ALL);
        let member_id = f.required_id("memberId");
        let context = f.enum_or("context", Context::ALL, Context::Common);
        (lookup, member_id, context)
    }

    fn build(parts: (Option<LookupKey>, Option<String>, Option<Context>)) -> Option<Self> {
        Some(Self {
            lookup: parts.0?,
            member_id: parts.1?,
            context: parts.2?,
        })
    }
}

impl Schema for MemberLookupInput {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let parts = Self::read(&mut f);
        f.finish(|| Self::build(parts))
    }
}

/// Member search filters, sent as the JSON body of the search request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSearchInput {
    #[serde(flatten)]
    pub filters: MemberSearchFilters,
    pub page: u32,
    pub page_size: u32,
    pub context: Context,
}

impl Schema for MemberSearchInput {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let first_name = f.optional_trimmed("firstName");
        let last_name = f.optional_trimmed("lastName");
        let date_of_birth = f.optional_iso_date("dateOfBirth");
        let group_id = f.optional_trimmed("groupId");
        let subscriber_id = f.optional_trimmed("subscriberId");
        let page = f.u32_in_or("page", 1..=u32::MAX, 1);
        let page_size = f.u32_in_or("pageSize", 1..=MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE);
        let context = f.enum_or("context", Context::ALL, Context::Common);
        f.finish(|| {
            Some(MemberSearchInput {
                filters: MemberSearchFilters {
                    first_name,
                    last_name,
                    date_of_birth: date_of_birth?,
                    group_id,
                    subscriber_id,
                },
                page: page?,
                page_size: page_size?,
                context: context?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityInput {
    #[serde(flatten)]
    pub member: MemberLookupInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<String>,
}

impl Schema for EligibilityInput {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let member = MemberLookupInput::read(&mut f);
        let as_of_date = f.optional_iso_date("asOfDate");
        f.finish(|| {
            Some(EligibilityInput {
                member: MemberLookupInput::build(member)?,
                as_of_date: as_of_date?,
            })
        })
    }
}

/// Claims search window. Dates stay in their `MM-DD-YYYY` wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsSearchInput {
    #[serde(flatten)]
    pub member: MemberLookupInput,
    pub from_date: String,
    pub to_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_type: Option<String>,
    pub max_result: u32,
}

impl Schema for ClaimsSearchInput {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let member = MemberLookupInput::read(&mut f);
        let from = f.required_claim_date("fromDate");
        let to = f.required_claim_date("toDate");
        let claim_type = f.optional_trimmed("claimType");
        let max_result = f.u32_in_or("maxResult", 1..=MAX_RESULT_LIMIT, DEFAULT_MAX_RESULT);
        if let (Some((_, from)), Some((_, to))) = (&from, &to)
            && from > to
        {
            f.reject("toDate", "must not be earlier than fromDate", "range");
        }
        f.finish(|| {
            Some(ClaimsSearchInput {
                member: MemberLookupInput::build(member)?,
                from_date: from?.0,
                to_date: to?.0,
                claim_type,
                max_result: max_result?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimByIdInput {
    #[serde(flatten)]
    pub member: MemberLookupInput,
    pub claim_id: String,
}

impl Schema for ClaimByIdInput {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let member = MemberLookupInput::read(&mut f);
        let claim_id = f.required_id("claimId");
        f.finish(|| {
            Some(ClaimByIdInput {
                member: MemberLookupInput::build(member)?,
                claim_id: claim_id?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimLineItemsInput {
    #[serde(flatten)]
    pub member: MemberLookupInput,
    pub claim_type: String,
    pub claim_id: String,
}

impl Schema for ClaimLineItemsInput {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let member = MemberLookupInput::read(&mut f);
        let claim_type = f.required_id("claimType");
        let claim_id = f.required_id("claimId");
        f.finish(|| {
            Some(ClaimLineItemsInput {
                member: MemberLookupInput::build(member)?,
                claim_type: claim_type?,
                claim_id: claim_id?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitDetailsInput {
    #[serde(flatten)]
    pub member: MemberLookupInput,
    pub product_type: ProductType,
    pub plan_id: String,
    /// `None` means no `displayMode` is sent at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<BenefitRequestOptions>,
}

impl Schema for BenefitDetailsInput {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let member = MemberLookupInput::read(&mut f);
        let product_type = f.required_enum("productType", ProductType::ALL);
        let plan_id = f.required_id("planId");
        let options = f.optional_object("options");
        f.finish(|| {
            Some(BenefitDetailsInput {
                member: MemberLookupInput::build(member)?,
                product_type: product_type?,
                plan_id: plan_id?,
                options: options?,
            })
        })
    }
}
