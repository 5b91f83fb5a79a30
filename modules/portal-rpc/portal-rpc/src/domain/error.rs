use portal_http::HttpError;
use thiserror::Error;

/// Failure of one domain service operation.
///
/// Service clients never translate: a backend failure comes back as the raw
/// `HttpError` it was. Translation happens in the router.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("mock response not implemented for {operation}")]
    MockNotImplemented { operation: &'static str },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Empty, `.` or `..`: the URL would silently point at another resource.
    #[error("path segment '{segment}' cannot address a backend resource")]
    InvalidPathSegment { segment: String },

    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ServiceError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MockNotImplemented { .. } => "MOCK_NOT_IMPLEMENTED",
            Self::InvalidBaseUrl { .. } => "INVALID_BASE_URL",
            Self::InvalidPathSegment { .. } => "INVALID_PATH_SEGMENT",
            Self::Http(_) => "HTTP_ERROR",
        }
    }
}
