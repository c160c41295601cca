//! Request execution.
//!
//! This module provides:
//! - `Transport` / `AsyncTransport`: execute a request, return a response
//! - `UpgradingTransport`: rewrites `http` requests for preloaded hosts to
//!   `https` before delegating to a wrapped transport
//! - `Direct`: the default transport, backed by `ureq`

use once_cell::sync::Lazy;

use crate::error::Result;

#[cfg(feature = "async")]
use async_trait::async_trait;

mod direct;
mod upgrade;

pub use direct::{Direct, DirectOptions, DEFAULT_MAX_BODY_SIZE, DEFAULT_TIMEOUT};
pub use upgrade::{
    upgrade_request, upgrade_uri, UpgradingTransport, INSECURE_DEFAULT_PORT, INSECURE_SCHEME,
    SECURE_SCHEME,
};

#[cfg(feature = "async")]
pub use upgrade::AsyncUpgradingTransport;

/// Request type accepted by every transport
pub type HttpRequest = http::Request<Vec<u8>>;

/// Response type returned by every transport
pub type HttpResponse = http::Response<Vec<u8>>;

/// Request execution interface.
pub trait Transport: Send + Sync {
    /// Execute a single request and return its response.
    fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse>;
}

/// Async request execution interface.
#[cfg(feature = "async")]
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    /// Execute a single request asynchronously and return its response.
    async fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse>;
}

static DEFAULT_TRANSPORT: Lazy<Direct> = Lazy::new(Direct::new);

/// Process-wide transport used when a decorator has no explicit base.
pub fn default_transport() -> &'static Direct {
    &DEFAULT_TRANSPORT
}
