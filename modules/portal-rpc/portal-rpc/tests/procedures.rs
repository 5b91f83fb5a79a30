//! End-to-end procedure tests against a mocked backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use httpmock::prelude::*;
use portal_rpc::api::rest::routes;
use portal_rpc::config::PortalConfig;
use portal_rpc::domain::procedure::Procedure;
use portal_rpc::{PortalRouter, PortalRpcClient, ProcedureError, RequestContext, ValidationStage};
use portal_rpc_sdk::{Claim, ClaimByIdInput, Context, LookupKey, MemberLookupInput, Schema};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use tracing_test::traced_test;

fn config(server: &MockServer) -> PortalConfig {
    PortalConfig {
        base_url: server.base_url(),
        allow_insecure_http: true,
        timeout_ms: 2_000,
        ..PortalConfig::default()
    }
}

fn caller_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-portal-login", HeaderValue::from_static("jdoe"));
    headers.insert("authorization", HeaderValue::from_static("Bearer tok-secret-123"));
    headers
}

fn member_json(member_ck: i64) -> Value {
    json!({
        "memberCk": member_ck,
        "subscriberCk": 500,
        "subscriberId": "SUB-1",
        "firstName": "Jane",
        "lastName": "Doe",
        "dateOfBirth": "1980-04-12",
        "groupId": "G1"
    })
}

fn claim_json() -> Value {
    json!({
        "claimId": "C-1",
        "claimType": "MED",
        "serviceDate": "01-15-2024",
        "providerName": "General Hospital",
        "claimAmount": 1250.5,
        "paidAmount": 1000.0,
        "memberResponsibility": 250.5,
        "status": "PAID",
        "productType": "M"
    })
}

/// A well-formed input for each procedure.
fn valid_input(procedure: Procedure) -> Value {
    let member = json!({"lookup": "byMemberId", "memberId": "M1"});
    match procedure {
        Procedure::MemberGet | Procedure::MemberGetExtended | Procedure::MemberGetEligibility => {
            member
        }
        Procedure::MemberSearch => json!({"lastName": "Doe"}),
        Procedure::ClaimsSearch => json!({
            "lookup": "byMemberId", "memberId": "M1", "fromDate": "01-01-2024", "toDate": "02-01-2024"
        }),
        Procedure::ClaimsGetById => {
            json!({"lookup": "byMemberId", "memberId": "M1", "claimId": "C-1"})
        }
        Procedure::ClaimsGetLineItems => json!({
            "lookup": "byMemberId", "memberId": "M1", "claimType": "MED", "claimId": "C-1"
        }),
        Procedure::BenefitsGetDetails => json!({
            "lookup": "byMemberId", "memberId": "M1", "productType": "D", "planId": "P1"
        }),
    }
}

#[tokio::test]
async fn member_get_uses_context_prefix() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/employer/v1/members/byMemberId/12345")
            .header("x-portal-login", "jdoe")
            .header("authorization", "Bearer tok-secret-123");
        then.status(200).json_body(member_json(1));
    });

    let portal = PortalRouter::new(config(&server));
    let data = portal
        .dispatch(
            Procedure::MemberGet,
            &caller_headers(),
            &json!({"lookup": "byMemberId", "memberId": "12345", "context": "employer"}),
        )
        .await
        .unwrap();

    mock.assert();
    assert_eq!(data["memberCk"], 1);
    assert_eq!(data["firstName"], "Jane");
}

#[tokio::test]
async fn anonymous_calls_never_reach_backend() {
    let server = MockServer::start();
    let get = server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(member_json(1));
    });
    let post = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!([]));
    });

    let portal = PortalRouter::new(config(&server));
    let mut blank = HeaderMap::new();
    blank.insert("x-portal-login", HeaderValue::from_static("   "));
    blank.insert("authorization", HeaderValue::from_static("Bearer tok-secret-123"));

    for procedure in Procedure::ALL.iter().copied() {
        for headers in [HeaderMap::new(), blank.clone()] {
            let err = portal
                .dispatch(procedure, &headers, &valid_input(procedure))
                .await
                .unwrap_err();
            assert!(matches!(err, ProcedureError::Unauthorized), "{procedure}: {err:?}");
        }
    }
    assert_eq!(get.calls(), 0);
    assert_eq!(post.calls(), 0);
}

#[tokio::test]
async fn unauthorized_wins_over_invalid_input() {
    let server = MockServer::start();
    let portal = PortalRouter::new(config(&server));
    let err = portal
        .dispatch(Procedure::ClaimsSearch, &HeaderMap::new(), &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ProcedureError::Unauthorized));
}

#[tokio::test]
async fn mock_mode_fails_every_procedure_without_traffic() {
    let server = MockServer::start();
    let get = server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(json!({}));
    });
    let post = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!([]));
    });

    let portal = PortalRouter::new(PortalConfig {
        mock_enabled: Some(true),
        ..config(&server)
    });
    for procedure in Procedure::ALL.iter().copied() {
        let input = valid_input(procedure);
        let err = portal
            .dispatch(procedure, &caller_headers(), &input)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ProcedureError::MockNotImplemented { .. }),
            "{procedure}: {err:?}"
        );
    }
    assert_eq!(get.calls(), 0);
    assert_eq!(post.calls(), 0);
}

#[tokio::test]
async fn dot_segment_ids_never_reach_backend() {
    let server = MockServer::start();
    let get = server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(claim_json());
    });

    let portal = PortalRouter::new(config(&server));
    for input in [
        json!({"lookup": "byMemberId", "memberId": "..", "claimId": "C-1"}),
        json!({"lookup": "byMemberId", "memberId": "M1", "claimId": "."}),
    ] {
        let err = portal
            .dispatch(Procedure::ClaimsGetById, &caller_headers(), &input)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                ProcedureError::ValidationFailed { stage: ValidationStage::Input, .. }
            ),
            "{input}: {err:?}"
        );
    }
    assert_eq!(get.calls(), 0);
}

#[tokio::test]
async fn search_synthesizes_single_page() {
    for count in [0_i64, 1, 3] {
        let server = MockServer::start();
        let members: Vec<Value> = (0..count).map(member_json).collect();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/members/search");
            then.status(200).json_body(json!(members));
        });

        let portal = PortalRouter::new(config(&server));
        let data = portal
            .dispatch(
                Procedure::MemberSearch,
                &caller_headers(),
                &json!({"lastName": "Doe", "page": 1, "pageSize": 20}),
            )
            .await
            .unwrap();

        assert_eq!(
            data["pagination"],
            json!({"page": 1, "pageSize": 20, "total": count, "totalPages": 1})
        );
        assert_eq!(data["data"].as_array().map(Vec::len), usize::try_from(count).ok());
    }
}

#[tokio::test]
async fn benefits_omit_display_mode_without_options() {
    let server = MockServer::start();
    let details = json!({
        "planId": "P1",
        "productType": "D",
        "serviceClasses": [],
        "summary": {
            "individualDeductible": 50,
            "familyDeductible": 150,
            "individualOutOfPocketMax": 1000,
            "familyOutOfPocketMax": 3000
        }
    });
    let with_mode = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/members/byMemberId/M1/benefits/D/P1")
            .query_param_exists("displayMode");
        then.status(200).json_body(details.clone());
    });
    let without_mode = server.mock(|when, then| {
        when.method(GET).path("/api/v1/members/byMemberId/M1/benefits/D/P1");
        then.status(200).json_body(details.clone());
    });

    let portal = PortalRouter::new(config(&server));
    let input = json!({"lookup": "byMemberId", "memberId": "M1", "productType": "D", "planId": "P1"});
    portal
        .dispatch(Procedure::BenefitsGetDetails, &caller_headers(), &input)
        .await
        .unwrap();

    assert_eq!(with_mode.calls(), 0);
    assert_eq!(without_mode.calls(), 1);
}

#[tokio::test]
async fn translate_and_propagate_policies_differ() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(503).body("maintenance");
    });
    let portal = PortalRouter::new(config(&server));

    let translated = portal
        .dispatch(
            Procedure::MemberGet,
            &caller_headers(),
            &json!({"lookup": "byMemberId", "memberId": "M1"}),
        )
        .await
        .unwrap_err();
    assert!(matches!(translated, ProcedureError::Internal { .. }));

    let propagated = portal
        .dispatch(
            Procedure::ClaimsGetById,
            &caller_headers(),
            &json!({"lookup": "byMemberId", "memberId": "M1", "claimId": "C-1"}),
        )
        .await
        .unwrap_err();
    match propagated {
        ProcedureError::Upstream(source) => {
            let http = source.downcast_ref::<portal_http::HttpError>().unwrap();
            assert_eq!(http.status().map(|s| s.as_u16()), Some(503));
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_backend_record_fails_output_validation() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/members/byMemberId/M1/claims/C-1");
        then.status(200).json_body(json!({"claimId": "C-1"}));
    });

    let portal = PortalRouter::new(config(&server));
    let err = portal
        .dispatch(
            Procedure::ClaimsGetById,
            &caller_headers(),
            &json!({"lookup": "byMemberId", "memberId": "M1", "claimId": "C-1"}),
        )
        .await
        .unwrap_err();

    match err {
        ProcedureError::ValidationFailed { stage, violations } => {
            assert_eq!(stage, ValidationStage::Output);
            assert!(violations.iter().any(|v| v.field == "claimAmount"));
        }
        other => panic!("expected output validation failure, got {other:?}"),
    }
}

#[tokio::test]
async fn typed_claim_revalidates_unchanged() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/broker/v1/members/byMemberCk/77/claims/C-1");
        then.status(200).json_body(claim_json());
    });

    let portal = PortalRouter::new(config(&server));
    let ctx = RequestContext::new("jdoe")
        .unwrap()
        .with_base_url(server.base_url())
        .with_insecure_http(true);
    let claim = portal
        .get_claim(
            &ctx,
            ClaimByIdInput {
                member: MemberLookupInput::new(LookupKey::ByMemberCk, "77", Context::Broker),
                claim_id: "C-1".to_owned(),
            },
        )
        .await
        .unwrap();

    let again = Claim::parse(&serde_json::to_value(&claim).unwrap()).unwrap();
    assert_eq!(again, claim);
}

#[tokio::test]
#[traced_test]
async fn bearer_token_is_never_logged() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(500);
    });

    let portal = PortalRouter::new(config(&server));
    let _ = portal
        .dispatch(
            Procedure::MemberGet,
            &caller_headers(),
            &json!({"lookup": "byMemberId", "memberId": "M1"}),
        )
        .await;

    assert!(logs_contain("procedure failed"));
    assert!(!logs_contain("tok-secret-123"));
}

#[tokio::test]
async fn http_surface_renders_problems_and_data() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/members/byMemberId/M1/claims/C-1/lines");
        then.status(404).body("no such claim");
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/members/byMemberId/M1");
        then.status(200).json_body(member_json(9));
    });

    let app = routes::router(Arc::new(PortalRouter::new(config(&server))));

    let request = Request::builder()
        .method("POST")
        .uri("/rpc/member.get")
        .header("x-portal-login", "jdoe")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"lookup":"byMemberId","memberId":"M1"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["memberCk"], 9);

    let request = Request::builder()
        .method("POST")
        .uri("/rpc/claims.getLineItems")
        .header("x-portal-login", "jdoe")
        .body(Body::from(
            r#"{"lookup":"byMemberId","memberId":"M1","claimType":"MED","claimId":"C-1"}"#,
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "UPSTREAM_FAILURE");
    assert_eq!(json["detail"], "Backend responded with status 404");
}
