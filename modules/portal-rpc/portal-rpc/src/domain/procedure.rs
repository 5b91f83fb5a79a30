//! Procedure catalog and per-procedure error policy.

use std::fmt;
use std::str::FromStr;

use portal_rpc_sdk::{BoxError, ProcedureError};

use super::error::ServiceError;

/// How a procedure surfaces a failed backend call.
///
/// The split between procedures is historical and kept as-is: callers of
/// the `Propagate` procedures rely on seeing the raw upstream error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Wrap as `Internal` with the original error as source.
    Translate,
    /// Return `Upstream` carrying the raw error.
    Propagate,
}

/// Every procedure the gateway exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    MemberGet,
    MemberGetExtended,
    MemberSearch,
    MemberGetEligibility,
    ClaimsSearch,
    ClaimsGetById,
    ClaimsGetLineItems,
    BenefitsGetDetails,
}

/// Wire name and error policy per procedure.
const CATALOG: &[(Procedure, &str, ErrorPolicy)] = &[
    (Procedure::MemberGet, "member.get", ErrorPolicy::Translate),
    (Procedure::MemberGetExtended, "member.getExtended", ErrorPolicy::Translate),
    (Procedure::MemberSearch, "member.search", ErrorPolicy::Translate),
    (Procedure::MemberGetEligibility, "member.getEligibility", ErrorPolicy::Propagate),
    (Procedure::ClaimsSearch, "claims.search", ErrorPolicy::Translate),
    (Procedure::ClaimsGetById, "claims.getById", ErrorPolicy::Propagate),
    (Procedure::ClaimsGetLineItems, "claims.getLineItems", ErrorPolicy::Propagate),
    (Procedure::BenefitsGetDetails, "benefits.getDetails", ErrorPolicy::Translate),
];

impl Procedure {
    pub const ALL: &'static [Procedure] = &[
        Procedure::MemberGet,
        Procedure::MemberGetExtended,
        Procedure::MemberSearch,
        Procedure::MemberGetEligibility,
        Procedure::ClaimsSearch,
        Procedure::ClaimsGetById,
        Procedure::ClaimsGetLineItems,
        Procedure::BenefitsGetDetails,
    ];

    fn entry(self) -> (&'static str, ErrorPolicy) {
        CATALOG
            .iter()
            .find(|(p, _, _)| *p == self)
            .map_or(("", ErrorPolicy::Translate), |(_, name, policy)| (*name, *policy))
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.entry().0
    }

    #[must_use]
    pub fn error_policy(self) -> ErrorPolicy {
        self.entry().1
    }

    /// Map a service failure onto the procedure's error vocabulary.
    ///
    /// `MockNotImplemented` keeps its own kind under either policy.
    #[must_use]
    pub fn translate(self, err: ServiceError) -> ProcedureError {
        if let ServiceError::MockNotImplemented { operation } = err {
            return ProcedureError::MockNotImplemented {
                operation: operation.to_owned(),
            };
        }
        match self.error_policy() {
            ErrorPolicy::Translate => {
                tracing::error!(procedure = self.name(), error = %err, "procedure failed");
                ProcedureError::Internal {
                    message: "internal failure".to_owned(),
                    source: raw_source(err),
                }
            }
            ErrorPolicy::Propagate => {
                tracing::warn!(procedure = self.name(), error = %err, "upstream failure propagated");
                ProcedureError::Upstream(raw_source(err))
            }
        }
    }
}

/// Unwrap to the underlying `HttpError` where there is one.
fn raw_source(err: ServiceError) -> BoxError {
    match err {
        ServiceError::Http(http) => Box::new(http),
        other => Box::new(other),
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name that matches no procedure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown procedure '{0}'")]
pub struct UnknownProcedure(pub String);

impl FromStr for Procedure {
    type Err = UnknownProcedure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(p, _, _)| *p)
            .ok_or_else(|| UnknownProcedure(s.to_owned()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use portal_http::HttpError;
    use std::time::Duration;

    #[test]
    fn names_round_trip() {
        for p in Procedure::ALL {
            assert_eq!(p.name().parse::<Procedure>().unwrap(), *p);
        }
        assert_eq!(
            "member.delete".parse::<Procedure>(),
            Err(UnknownProcedure("member.delete".to_owned()))
        );
    }

    #[test]
    fn policy_split_is_explicit() {
        let propagating: Vec<_> = Procedure::ALL
            .iter()
            .filter(|p| p.error_policy() == ErrorPolicy::Propagate)
            .map(|p| p.name())
            .collect();
        assert_eq!(
            propagating,
            vec!["member.getEligibility", "claims.getById", "claims.getLineItems"]
        );
    }

    #[test]
    fn translate_wraps_as_internal() {
        let err = Procedure::MemberGet
            .translate(ServiceError::Http(HttpError::Timeout(Duration::from_secs(1))));
        match err {
            ProcedureError::Internal { message, source } => {
                assert_eq!(message, "internal failure");
                assert!(source.downcast_ref::<HttpError>().is_some());
            }
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn propagate_keeps_raw_http_error() {
        let err = Procedure::ClaimsGetById
            .translate(ServiceError::Http(HttpError::Timeout(Duration::from_secs(1))));
        match err {
            ProcedureError::Upstream(source) => {
                assert!(matches!(
                    source.downcast_ref::<HttpError>(),
                    Some(HttpError::Timeout(_))
                ));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn mock_not_implemented_survives_both_policies() {
        for p in [Procedure::MemberGet, Procedure::ClaimsGetLineItems] {
            let err = p.translate(ServiceError::MockNotImplemented {
                operation: "getMember",
            });
            assert!(matches!(
                err,
                ProcedureError::MockNotImplemented { ref operation } if operation == "getMember"
            ));
        }
    }
}
