#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Outbound HTTP client for the portal service clients.
//!
//! A hyper-based client wrapped in a small tower stack:
//! - TLS via rustls (HTTPS only unless insecure HTTP is opted into)
//! - Per-request timeout
//! - User-Agent header injection
//! - Transparent response decompression (gzip, brotli, deflate)
//! - Response body size limits
//!
//! There is deliberately no retry layer: every call is a single round trip
//! and a failure surfaces immediately.
//!
//! # Example
//!
//! ```ignore
//! use portal_http::HttpClient;
//! use std::time::Duration;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_millis(30_000))
//!     .build()?;
//!
//! let member: serde_json::Value = client
//!     .get("https://api.memberportal.com/api/v1/members/byMemberId/42")
//!     .header("x-portal-login", "jdoe")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod request;
mod response;
mod tls;
mod user_agent;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use request::RequestBuilder;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse, ResponseBody};
pub use user_agent::{UserAgentLayer, UserAgentService};
