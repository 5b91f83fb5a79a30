//! Portal RPC gateway
//!
//! Resolves a [`RequestContext`] from request headers, dispatches named
//! procedures to the member, claims and benefits backends, and maps every
//! failure onto one error vocabulary.
//!
//! The public API is defined in `portal-rpc-sdk` and re-exported here.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub use portal_rpc_sdk::{
    BearerToken, Context, PortalRpcClient, ProcedureError, RequestContext, ValidationStage,
};

pub use config::{ConfigError, PortalConfig};
pub use domain::router::PortalRouter;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
