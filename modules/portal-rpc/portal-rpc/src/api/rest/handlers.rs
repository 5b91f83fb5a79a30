use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use portal_errors::ValidationViolation;
use portal_rpc_sdk::ProcedureError;
use serde::Serialize;
use serde_json::Value;

use super::error::{extract_trace_id, procedure_error_to_problem, unknown_procedure_problem};
use crate::domain::context;
use crate::domain::procedure::Procedure;
use crate::domain::router::PortalRouter;

#[derive(Debug, Serialize)]
struct DataEnvelope {
    data: Value,
}

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
}

#[allow(clippy::unused_async)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// `POST /rpc/{procedure}`: JSON input in, `{"data": ...}` or a Problem out.
pub async fn call_procedure(
    State(portal): State<Arc<PortalRouter>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let instance = format!("/rpc/{name}");
    let trace_id = extract_trace_id(&headers);

    let procedure = match name.parse::<Procedure>() {
        Ok(procedure) => procedure,
        Err(e) => {
            tracing::debug!(procedure = %name, "unknown procedure");
            return unknown_procedure_problem(&e, &instance, trace_id).into_response();
        }
    };

    let input = match parse_body(&body) {
        Ok(input) => input,
        Err(e) => {
            // anonymous callers get 401 even when the body is unreadable
            let e = context::resolve(&headers, portal.config()).err().unwrap_or(e);
            return procedure_error_to_problem(&e, &instance, trace_id).into_response();
        }
    };

    match portal.dispatch(procedure, &headers, &input).await {
        Ok(data) => Json(DataEnvelope { data }).into_response(),
        Err(e) => procedure_error_to_problem(&e, &instance, trace_id).into_response(),
    }
}

/// An empty body means `{}`.
fn parse_body(body: &[u8]) -> Result<Value, ProcedureError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| {
        ProcedureError::input(vec![
            ValidationViolation::new("$", format!("invalid JSON: {e}")).with_code("json"),
        ])
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::api::rest::routes;
    use crate::config::PortalConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt as _;

    fn app(config: PortalConfig) -> axum::Router {
        routes::router(Arc::new(PortalRouter::new(config)))
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn blank_body_is_empty_object() {
        assert_eq!(parse_body(b"").unwrap(), serde_json::json!({}));
        assert_eq!(parse_body(b"  \n").unwrap(), serde_json::json!({}));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app(PortalConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn unknown_procedure_is_404() {
        let request = Request::builder()
            .method("POST")
            .uri("/rpc/member.delete")
            .header("x-portal-login", "jdoe")
            .body(Body::empty())
            .unwrap();
        let response = app(PortalConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()["content-type"],
            "application/problem+json"
        );
        let json = body_json(response).await;
        assert_eq!(json["code"], "PROCEDURE_NOT_FOUND");
        assert_eq!(json["instance"], "/rpc/member.delete");
        assert!(json.get("traceId").is_none());
    }

    #[tokio::test]
    async fn problem_echoes_caller_trace_id() {
        let request = Request::builder()
            .method("POST")
            .uri("/rpc/member.get")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();
        let response = app(PortalConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["traceId"], "req-42");
    }

    #[tokio::test]
    async fn missing_caller_is_401_even_with_bad_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/rpc/member.get")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(PortalConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/rpc/member.get")
            .header("x-portal-login", "jdoe")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(PortalConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["field"], "$");
        assert_eq!(json["errors"][0]["code"], "json");
    }

    #[tokio::test]
    async fn empty_body_reports_required_fields() {
        let request = Request::builder()
            .method("POST")
            .uri("/rpc/claims.getById")
            .header("x-portal-login", "jdoe")
            .body(Body::empty())
            .unwrap();
        let response = app(PortalConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        let fields: Vec<&str> = json["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["lookup", "memberId", "claimId"]);
    }

    #[tokio::test]
    async fn mock_mode_is_501() {
        let config = PortalConfig {
            mock_enabled: Some(true),
            ..PortalConfig::default()
        };
        let request = Request::builder()
            .method("POST")
            .uri("/rpc/member.get")
            .header("x-portal-login", "jdoe")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"lookup":"byMemberId","memberId":"42"}"#))
            .unwrap();
        let response = app(config).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        let json = body_json(response).await;
        assert_eq!(json["code"], "MOCK_NOT_IMPLEMENTED");
        assert_eq!(json["detail"], "No mock response for MemberService.getMember");
    }
}
