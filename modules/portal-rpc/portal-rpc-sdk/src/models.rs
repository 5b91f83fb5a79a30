//! Public models for the portal RPC gateway.
//!
//! Response snapshots are validated out of backend JSON through
//! [`Schema`](crate::schema::Schema) and serialized back with camelCase names.
//! Money values are decimals carried as JSON numbers.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{Fields, Schema, Violations};

/// Error returned when a string does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant(other.to_owned())),
                }
            }
        }
    };
}

wire_enum! {
    /// Organizational scope of a request; selects the backend path prefix.
    pub enum Context {
        Common => "common",
        Employer => "employer",
        Broker => "broker",
        Internal => "internal",
    }
}

wire_enum! {
    /// Which identifier a member-lookup path parameter holds.
    pub enum LookupKey {
        ByLoginId => "byLoginId",
        ByMemberId => "byMemberId",
        ByMemberCk => "byMemberCk",
        BySubscriberCk => "bySubscriberCk",
        BySubscriberId => "bySubscriberId",
    }
}

wire_enum! {
    /// Medical, dental, vision or flex product line.
    pub enum ProductType {
        Medical => "M",
        Dental => "D",
        Vision => "V",
        Flex => "F",
    }
}

/// Member identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub member_ck: i64,
    pub subscriber_ck: i64,
    pub subscriber_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

impl Schema for Member {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let member_ck = f.required_i64("memberCk");
        let subscriber_ck = f.required_i64("subscriberCk");
        let subscriber_id = f.required_str("subscriberId");
        let first_name = f.required_str("firstName");
        let last_name = f.required_str("lastName");
        let date_of_birth = f.required_str("dateOfBirth");
        let group_id = f.required_str("groupId");
        let suffix = f.optional_str("suffix");
        let ssn = f.optional_str("ssn");
        let relationship = f.optional_str("relationship");
        f.finish(|| {
            Some(Member {
                member_ck: member_ck?,
                subscriber_ck: subscriber_ck?,
                subscriber_id: subscriber_id?,
                first_name: first_name?,
                last_name: last_name?,
                date_of_birth: date_of_birth?,
                group_id: group_id?,
                suffix,
                ssn,
                relationship,
            })
        })
    }
}

/// Page metadata synthesized around a member search result.
///
/// The backend has no paging; `total` is the returned length and
/// `total_pages` is always 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    #[must_use]
    pub fn single_page(page: u32, page_size: u32, total: usize) -> Self {
        Self {
            page,
            page_size,
            total: u64::try_from(total).unwrap_or(u64::MAX),
            total_pages: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPage {
    pub data: Vec<Member>,
    pub pagination: Pagination,
}

/// One coverage line of an eligibility answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub product_type: ProductType,
    pub plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub effective_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<String>,
}

impl Schema for Coverage {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let product_type = f.required_enum("productType", ProductType::ALL);
        let plan_id = f.required_str("planId");
        let group_id = f.optional_str("groupId");
        let effective_date = f.required_str("effectiveDate");
        let termination_date = f.optional_str("terminationDate");
        f.finish(|| {
            Some(Coverage {
                product_type: product_type?,
                plan_id: plan_id?,
                group_id,
                effective_date: effective_date?,
                termination_date,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<String>,
    pub coverages: Vec<Coverage>,
}

impl Schema for Eligibility {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let eligible = f.required_bool("eligible");
        let as_of_date = f.optional_str("asOfDate");
        let coverages = f.required_list("coverages");
        f.finish(|| {
            Some(Eligibility {
                eligible: eligible?,
                as_of_date,
                coverages: coverages?,
            })
        })
    }
}

/// Claim header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub claim_id: String,
    pub claim_type: String,
    pub service_date: String,
    pub provider_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub claim_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub member_responsibility: Decimal,
    pub status: String,
    pub product_type: ProductType,
}

impl Schema for Claim {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let claim_id = f.required_str("claimId");
        let claim_type = f.required_str("claimType");
        let service_date = f.required_str("serviceDate");
        let provider_name = f.required_str("providerName");
        let claim_amount = f.required_decimal("claimAmount");
        let paid_amount = f.required_decimal("paidAmount");
        let member_responsibility = f.required_decimal("memberResponsibility");
        let status = f.required_str("status");
        let product_type = f.required_enum("productType", ProductType::ALL);
        f.finish(|| {
            Some(Claim {
                claim_id: claim_id?,
                claim_type: claim_type?,
                service_date: service_date?,
                provider_name: provider_name?,
                claim_amount: claim_amount?,
                paid_amount: paid_amount?,
                member_responsibility: member_responsibility?,
                status: status?,
                product_type: product_type?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimLineItem {
    pub line_number: u32,
    pub procedure_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub service_date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub billed_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub allowed_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub member_responsibility: Decimal,
}

impl Schema for ClaimLineItem {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let line_number = f.required_u32_in("lineNumber", 1..=u32::MAX);
        let procedure_code = f.required_str("procedureCode");
        let description = f.optional_str("description");
        let service_date = f.required_str("serviceDate");
        let billed_amount = f.required_decimal("billedAmount");
        let allowed_amount = f.required_decimal("allowedAmount");
        let paid_amount = f.required_decimal("paidAmount");
        let member_responsibility = f.required_decimal("memberResponsibility");
        f.finish(|| {
            Some(ClaimLineItem {
                line_number: line_number?,
                procedure_code: procedure_code?,
                description,
                service_date: service_date?,
                billed_amount: billed_amount?,
                allowed_amount: allowed_amount?,
                paid_amount: paid_amount?,
                member_responsibility: member_responsibility?,
            })
        })
    }
}

/// Display preferences for benefit details.
///
/// The three flags travel as one `displayMode` bitmask; `indicator` and
/// `as_of_date` travel as their own query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitRequestOptions {
    #[serde(default)]
    pub group_by_service_class: bool,
    #[serde(default)]
    pub group_by_network_tier: bool,
    #[serde(default)]
    pub auto_sort: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<String>,
}

impl Schema for BenefitRequestOptions {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let group_by_service_class = f.flag("groupByServiceClass");
        let group_by_network_tier = f.flag("groupByNetworkTier");
        let auto_sort = f.flag("autoSort");
        let indicator = f.optional_trimmed("indicator");
        let as_of_date = f.optional_iso_date("asOfDate");
        f.finish(|| {
            Some(BenefitRequestOptions {
                group_by_service_class: group_by_service_class?,
                group_by_network_tier: group_by_network_tier?,
                auto_sort: auto_sort?,
                indicator,
                as_of_date: as_of_date?,
            })
        })
    }
}

/// One benefit row inside a service class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitDetail {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_tier: Option<String>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub copay: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub coinsurance_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitation: Option<String>,
}

impl Schema for BenefitDetail {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let description = f.required_str("description");
        let network_tier = f.optional_str("networkTier");
        let copay = f.optional_decimal("copay");
        let coinsurance_percent = f.optional_decimal("coinsurancePercent");
        let limitation = f.optional_str("limitation");
        f.finish(|| {
            Some(BenefitDetail {
                description: description?,
                network_tier,
                copay: copay?,
                coinsurance_percent: coinsurance_percent?,
                limitation,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClass {
    pub code: String,
    pub description: String,
    pub details: Vec<BenefitDetail>,
}

impl Schema for ServiceClass {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let code = f.required_str("code");
        let description = f.required_str("description");
        let details = f.required_list("details");
        f.finish(|| {
            Some(ServiceClass {
                code: code?,
                description: description?,
                details: details?,
            })
        })
    }
}

/// Deductible and out-of-pocket maximums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub individual_deductible: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub family_deductible: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub individual_out_of_pocket_max: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub family_out_of_pocket_max: Decimal,
}

impl Schema for BenefitSummary {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let individual_deductible = f.required_decimal("individualDeductible");
        let family_deductible = f.required_decimal("familyDeductible");
        let individual_out_of_pocket_max = f.required_decimal("individualOutOfPocketMax");
        let family_out_of_pocket_max = f.required_decimal("familyOutOfPocketMax");
        f.finish(|| {
            Some(BenefitSummary {
                individual_deductible: individual_deductible?,
                family_deductible: family_deductible?,
                individual_out_of_pocket_max: individual_out_of_pocket_max?,
                family_out_of_pocket_max: family_out_of_pocket_max?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitDetails {
    pub plan_id: String,
    pub product_type: ProductType,
    pub service_classes: Vec<ServiceClass>,
    pub summary: BenefitSummary,
}

impl Schema for BenefitDetails {
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations> {
        let mut f = Fields::new(value, path);
        let plan_id = f.required_str("planId");
        let product_type = f.required_enum("productType", ProductType::ALL);
        let service_classes = f.required_list("serviceClasses");
        let summary = f.required_object("summary");
        f.finish(|| {
            Some(BenefitDetails {
                plan_id: plan_id?,
                product_type: product_type?,
                service_classes: service_classes?,
                summary: summary?,
            })
        })
    }
}
