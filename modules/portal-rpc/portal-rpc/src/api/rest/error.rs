use http::HeaderMap;
use portal_errors::{ErrDef, Problem};
use portal_http::HttpError;
use portal_rpc_sdk::{ProcedureError, ValidationStage};

use crate::domain::procedure::UnknownProcedure;

pub const UNAUTHORIZED: ErrDef = ErrDef {
    status: 401,
    title: "Unauthorized",
    code: "UNAUTHORIZED",
    type_url: "https://errors.memberportal.com/UNAUTHORIZED",
};

pub const VALIDATION_FAILED: ErrDef = ErrDef {
    status: 400,
    title: "Validation Failed",
    code: "VALIDATION_FAILED",
    type_url: "https://errors.memberportal.com/VALIDATION_FAILED",
};

pub const MOCK_NOT_IMPLEMENTED: ErrDef = ErrDef {
    status: 501,
    title: "Mock Not Implemented",
    code: "MOCK_NOT_IMPLEMENTED",
    type_url: "https://errors.memberportal.com/MOCK_NOT_IMPLEMENTED",
};

pub const INTERNAL_SERVER_ERROR: ErrDef = ErrDef {
    status: 500,
    title: "Internal Server Error",
    code: "INTERNAL_SERVER_ERROR",
    type_url: "https://errors.memberportal.com/INTERNAL_SERVER_ERROR",
};

pub const UPSTREAM_FAILURE: ErrDef = ErrDef {
    status: 502,
    title: "Upstream Failure",
    code: "UPSTREAM_FAILURE",
    type_url: "https://errors.memberportal.com/UPSTREAM_FAILURE",
};

/// Backend payload rejected by the output schema.
pub const BACKEND_PAYLOAD_INVALID: ErrDef = ErrDef {
    status: 502,
    title: "Invalid Backend Response",
    code: "VALIDATION_FAILED",
    type_url: "https://errors.memberportal.com/VALIDATION_FAILED",
};

pub const PROCEDURE_NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Procedure Not Found",
    code: "PROCEDURE_NOT_FOUND",
    type_url: "https://errors.memberportal.com/PROCEDURE_NOT_FOUND",
};

/// Trace id supplied by the caller, if any.
///
/// `x-trace-id` and `x-request-id` are taken as-is; a W3C `traceparent`
/// contributes its trace-id field. Nothing is made up when none is present.
#[must_use]
pub fn extract_trace_id(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    header("x-trace-id")
        .or_else(|| header("x-request-id"))
        .map(ToOwned::to_owned)
        .or_else(|| header("traceparent").and_then(traceparent_trace_id))
}

/// `version-traceid-parentid-flags`; the trace id is 32 lowercase hex digits, not all zero.
fn traceparent_trace_id(value: &str) -> Option<String> {
    let trace_id = value.split('-').nth(1)?;
    let valid = trace_id.len() == 32
        && trace_id.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        && trace_id.bytes().any(|b| b != b'0');
    valid.then(|| trace_id.to_owned())
}

fn finish(problem: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    let problem = problem.with_instance(instance);
    match trace_id {
        Some(id) => problem.with_trace_id(id),
        None => problem,
    }
}

/// Map a procedure failure to an RFC 9457 Problem.
#[must_use]
pub fn procedure_error_to_problem(
    e: &ProcedureError,
    instance: &str,
    trace_id: Option<String>,
) -> Problem {
    let problem = match e {
        ProcedureError::Unauthorized => UNAUTHORIZED.as_problem("Caller identity is required"),
        ProcedureError::ValidationFailed { stage, violations } => {
            let problem = match stage {
                ValidationStage::Input => {
                    VALIDATION_FAILED.as_problem("Request input failed validation")
                }
                ValidationStage::Output => {
                    BACKEND_PAYLOAD_INVALID.as_problem("Backend response failed validation")
                }
            };
            problem.with_errors(violations.clone())
        }
        ProcedureError::MockNotImplemented { operation } => MOCK_NOT_IMPLEMENTED
            .as_problem(format!("No mock response for {operation}")),
        ProcedureError::Internal { message, source } => {
            tracing::error!(error = %source, "{message}");
            INTERNAL_SERVER_ERROR.as_problem("An internal error occurred")
        }
        ProcedureError::Upstream(source) => {
            tracing::warn!(error = %source, "upstream failure");
            UPSTREAM_FAILURE.as_problem(upstream_detail(source.as_ref()))
        }
    };
    finish(problem, instance, trace_id)
}

#[must_use]
pub fn unknown_procedure_problem(
    e: &UnknownProcedure,
    instance: &str,
    trace_id: Option<String>,
) -> Problem {
    finish(
        PROCEDURE_NOT_FOUND.as_problem(format!("No procedure named '{}'", e.0)),
        instance,
        trace_id,
    )
}

fn upstream_detail(source: &(dyn std::error::Error + Send + Sync + 'static)) -> String {
    match source.downcast_ref::<HttpError>() {
        Some(HttpError::HttpStatus { status, .. }) => {
            format!("Backend responded with status {}", status.as_u16())
        }
        Some(HttpError::Timeout(after)) => {
            format!("Backend did not respond within {} ms", after.as_millis())
        }
        Some(HttpError::Json(_)) => "Backend returned a malformed body".to_owned(),
        _ => "Backend request failed".to_owned(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::StatusCode;
    use portal_errors::ValidationViolation;
    use std::time::Duration;

    #[test]
    fn catalog_type_urls_share_base() {
        for def in [
            UNAUTHORIZED,
            VALIDATION_FAILED,
            MOCK_NOT_IMPLEMENTED,
            INTERNAL_SERVER_ERROR,
            UPSTREAM_FAILURE,
            BACKEND_PAYLOAD_INVALID,
            PROCEDURE_NOT_FOUND,
        ] {
            assert_eq!(
                def.type_url,
                format!("https://errors.memberportal.com/{}", def.code)
            );
        }
    }

    #[test]
    fn validation_problem_lists_violations() {
        let e = ProcedureError::input(vec![ValidationViolation::new("memberId", "is required")]);
        let p = procedure_error_to_problem(&e, "/rpc/member.get", None);
        assert_eq!(p.status, StatusCode::BAD_REQUEST);
        assert_eq!(p.code, "VALIDATION_FAILED");
        assert_eq!(p.instance, "/rpc/member.get");
        assert_eq!(p.errors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn internal_problem_hides_cause() {
        let e = ProcedureError::Internal {
            message: "internal failure".to_owned(),
            source: "db password rejected".into(),
        };
        let p = procedure_error_to_problem(&e, "/rpc/member.get", None);
        assert_eq!(p.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!p.detail.contains("password"));
    }

    #[test]
    fn upstream_problem_names_backend_status() {
        let e = ProcedureError::Upstream(Box::new(HttpError::HttpStatus {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body_preview: String::new(),
            content_type: None,
        }));
        let p = procedure_error_to_problem(&e, "/rpc/claims.getById", None);
        assert_eq!(p.status, StatusCode::BAD_GATEWAY);
        assert_eq!(p.detail, "Backend responded with status 503");

        let e = ProcedureError::Upstream(Box::new(HttpError::Timeout(Duration::from_millis(50))));
        let p = procedure_error_to_problem(&e, "/rpc/claims.getById", None);
        assert_eq!(p.detail, "Backend did not respond within 50 ms");
    }

    #[test]
    fn mock_and_unknown_procedure_statuses() {
        let e = ProcedureError::MockNotImplemented {
            operation: "MemberService.getMember".to_owned(),
        };
        assert_eq!(
            procedure_error_to_problem(&e, "/", None).status,
            StatusCode::NOT_IMPLEMENTED
        );

        let p = unknown_procedure_problem(&UnknownProcedure("nope".to_owned()), "/rpc/nope", None);
        assert_eq!(p.status, StatusCode::NOT_FOUND);
        assert_eq!(p.code, "PROCEDURE_NOT_FOUND");
    }

    #[test]
    fn output_validation_blames_backend() {
        let e = ProcedureError::output(vec![ValidationViolation::new("claimAmount", "is required")]);
        let p = procedure_error_to_problem(&e, "/rpc/claims.getById", None);
        assert_eq!(p.status, StatusCode::BAD_GATEWAY);
        assert_eq!(p.code, "VALIDATION_FAILED");
        assert_eq!(p.detail, "Backend response failed validation");
        assert_eq!(p.errors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn trace_id_comes_only_from_caller_headers() {
        assert_eq!(extract_trace_id(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(
            "traceparent",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01".parse().unwrap(),
        );
        assert_eq!(
            extract_trace_id(&headers).as_deref(),
            Some("4bf92f3577b34da6a3ce929d0e0e4736")
        );

        headers.insert("x-request-id", "req-7".parse().unwrap());
        assert_eq!(extract_trace_id(&headers).as_deref(), Some("req-7"));

        let mut malformed = HeaderMap::new();
        malformed.insert(
            "traceparent",
            "00-00000000000000000000000000000000-00f067aa0ba902b7-01".parse().unwrap(),
        );
        assert_eq!(extract_trace_id(&malformed), None);
    }

    #[test]
    fn problem_carries_supplied_trace_id() {
        let p = procedure_error_to_problem(
            &ProcedureError::Unauthorized,
            "/rpc/member.get",
            Some("req-7".to_owned()),
        );
        assert_eq!(p.trace_id.as_deref(), Some("req-7"));
        assert!(procedure_error_to_problem(&ProcedureError::Unauthorized, "/", None)
            .trace_id
            .is_none());
    }
}
