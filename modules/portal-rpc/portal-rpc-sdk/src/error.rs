//! Error types for the portal RPC gateway.

use std::fmt;

use portal_errors::ValidationViolation;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which side of a procedure failed schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    /// Caller-supplied input
    Input,
    /// Backend payload
    Output,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Uniform failure of a procedure call. Every kind is terminal.
#[derive(Debug, Error)]
pub enum ProcedureError {
    /// No caller identity; raised before any backend call.
    #[error("caller identity is missing")]
    Unauthorized,

    #[error("{stage} validation failed: {} violation(s)", .violations.len())]
    ValidationFailed {
        stage: ValidationStage,
        violations: Vec<ValidationViolation>,
    },

    /// Mock mode is on and no mock response exists for the operation.
    #[error("mock response not implemented for {operation}")]
    MockNotImplemented { operation: String },

    /// Upstream failure wrapped by a translating procedure.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: BoxError,
    },

    /// Upstream failure passed through untranslated.
    #[error("upstream failure: {0}")]
    Upstream(#[source] BoxError),
}

impl ProcedureError {
    #[must_use]
    pub fn input(violations: Vec<ValidationViolation>) -> Self {
        Self::ValidationFailed {
            stage: ValidationStage::Input,
            violations,
        }
    }

    #[must_use]
    pub fn output(violations: Vec<ValidationViolation>) -> Self {
        Self::ValidationFailed {
            stage: ValidationStage::Output,
            violations,
        }
    }

    /// Stable machine-readable kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::MockNotImplemented { .. } => "MOCK_NOT_IMPLEMENTED",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
            Self::Upstream(_) => "UPSTREAM_FAILURE",
        }
    }
}
