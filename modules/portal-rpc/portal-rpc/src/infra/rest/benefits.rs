use portal_rpc_sdk::{BenefitRequestOptions, LookupKey, ProductType};
use tracing::instrument;

use super::base::{RestClient, ServiceResponse};
use super::options::ServiceOptions;
use crate::domain::display_mode::DisplayMode;
use crate::domain::error::ServiceError;

/// Query parameters for a benefit details request.
///
/// Without options no `displayMode` is sent at all; options with no flag set
/// send `displayMode=0`.
#[must_use]
pub fn benefit_query(options: Option<&BenefitRequestOptions>) -> Vec<(&'static str, String)> {
    let Some(options) = options else {
        return Vec::new();
    };
    let mut query = vec![(
        "displayMode",
        DisplayMode::from_options(options).to_string(),
    )];
    if let Some(indicator) = &options.indicator {
        query.push(("indicator", indicator.clone()));
    }
    if let Some(as_of_date) = &options.as_of_date {
        query.push(("asOfDate", as_of_date.clone()));
    }
    query
}

/// Client for the benefits backend.
pub struct BenefitsServiceClient {
    rest: RestClient,
}

impl BenefitsServiceClient {
    #[must_use]
    pub fn new(options: ServiceOptions) -> Self {
        Self {
            rest: RestClient::new(options),
        }
    }

    /// # Errors
    /// `MockNotImplemented` in mock mode, otherwise the raw backend failure.
    #[instrument(
        skip_all,
        fields(context = %self.rest.options().context, product_type = %product_type, plan_id = %plan_id)
    )]
    pub async fn get_benefit_details(
        &self,
        lookup: LookupKey,
        member_id: &str,
        product_type: ProductType,
        plan_id: &str,
        options: Option<&BenefitRequestOptions>,
    ) -> Result<ServiceResponse, ServiceError> {
        const OPERATION: &str = "BenefitsService.getBenefitDetails";
        self.rest.ensure_live(OPERATION)?;
        let url = self.rest.endpoint(
            &[
                "members",
                lookup.as_str(),
                member_id,
                "benefits",
                product_type.as_str(),
                plan_id,
            ],
            &benefit_query(options),
        )?;
        self.rest.get(OPERATION, url).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use portal_http::TransportSecurity;
    use portal_rpc_sdk::Context;
    use serde_json::json;

    #[test]
    fn absent_options_send_no_display_mode() {
        assert!(benefit_query(None).is_empty());
    }

    #[test]
    fn empty_options_send_zero() {
        assert_eq!(
            benefit_query(Some(&BenefitRequestOptions::default())),
            vec![("displayMode", "0".to_owned())]
        );
    }

    #[test]
    fn indicator_and_date_pass_through() {
        let options = BenefitRequestOptions {
            group_by_service_class: true,
            auto_sort: true,
            indicator: Some("IN".to_owned()),
            as_of_date: Some("2024-06-01".to_owned()),
            ..BenefitRequestOptions::default()
        };
        assert_eq!(
            benefit_query(Some(&options)),
            vec![
                ("displayMode", "5".to_owned()),
                ("indicator", "IN".to_owned()),
                ("asOfDate", "2024-06-01".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn details_request_path_and_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/broker/v1/members/byMemberId/M1/benefits/V/PLN-9")
                .query_param("displayMode", "2");
            then.status(200).json_body(json!({"planId": "PLN-9"}));
        });

        let options = ServiceOptions {
            base_url: server.base_url(),
            transport: TransportSecurity::AllowInsecureHttp,
            ..ServiceOptions::new(Context::Broker, "jdoe")
        };
        let benefit_options = BenefitRequestOptions {
            group_by_network_tier: true,
            ..BenefitRequestOptions::default()
        };
        let resp = BenefitsServiceClient::new(options)
            .get_benefit_details(
                LookupKey::ByMemberId,
                "M1",
                ProductType::Vision,
                "PLN-9",
                Some(&benefit_options),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(resp.data["planId"], "PLN-9");
    }
}
