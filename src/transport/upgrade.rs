//! Preload-driven `http` to `https` upgrade.

use std::sync::Arc;

use http::uri::{Authority, PathAndQuery, Scheme};
use http::{Request, Uri};

use crate::error::Result;
use crate::preload::PreloadIndex;

use super::{default_transport, HttpRequest, HttpResponse, Transport};

#[cfg(feature = "async")]
use super::AsyncTransport;
#[cfg(feature = "async")]
use async_trait::async_trait;

/// Scheme eligible for upgrading
pub const INSECURE_SCHEME: &str = "http";

/// Scheme requests are upgraded to
pub const SECURE_SCHEME: &str = "https";

/// Only an absent port or this literal port string allows an upgrade.
/// Compared as a string, so `"080"` does not qualify.
pub const INSECURE_DEFAULT_PORT: &str = "80";

/// Compute the upgraded URI for `uri`, or `None` if it must be sent as is.
///
/// An upgrade happens when the scheme is `http`, the port is absent or
/// `"80"`, and the host is preloaded. The result keeps any userinfo, path
/// and query but drops the explicit port.
pub fn upgrade_uri(index: &PreloadIndex, uri: &Uri) -> Option<Uri> {
    if uri.scheme_str() != Some(INSECURE_SCHEME) {
        return None;
    }

    let authority = uri.authority()?;
    if let Some(port) = authority.port() {
        if port.as_str() != INSECURE_DEFAULT_PORT {
            return None;
        }
    }

    let host = authority.host();
    if !index.is_preloaded(host) {
        return None;
    }

    let bare = match authority.as_str().rsplit_once('@') {
        Some((userinfo, _)) => format!("{}@{}", userinfo, host),
        None => host.to_string(),
    };
    let authority = match Authority::try_from(bare.as_str()) {
        Ok(authority) => authority,
        Err(e) => {
            log::debug!("not upgrading {}: {}", uri, e);
            return None;
        }
    };

    let mut parts = uri.clone().into_parts();
    parts.scheme = Some(Scheme::HTTPS);
    parts.authority = Some(authority);
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }

    match Uri::from_parts(parts) {
        Ok(upgraded) => Some(upgraded),
        Err(e) => {
            log::debug!("not upgrading {}: {}", uri, e);
            None
        }
    }
}

/// Rewrite `req` to `https` if its target is preloaded.
///
/// Everything except the URI (method, headers, version, extensions, body)
/// moves across untouched. Requests that don't qualify are returned as is.
pub fn upgrade_request<B>(index: &PreloadIndex, req: Request<B>) -> Request<B> {
    let Some(uri) = upgrade_uri(index, req.uri()) else {
        return req;
    };

    log::debug!("upgrading {} to {}", req.uri(), uri);
    let (mut parts, body) = req.into_parts();
    parts.uri = uri;
    Request::from_parts(parts, body)
}

/// Transport that upgrades requests for preloaded hosts to `https`.
///
/// It holds no per-request state and can be shared across threads. The
/// wrapped transport's response or error is returned unchanged.
#[derive(Clone)]
pub struct UpgradingTransport {
    index: Arc<PreloadIndex>,
    base: Option<Arc<dyn Transport>>,
}

impl UpgradingTransport {
    /// Create a new UpgradingTransport delegating to [`default_transport`].
    pub fn new(index: Arc<PreloadIndex>) -> Self {
        Self { index, base: None }
    }

    /// Set the wrapped transport.
    pub fn with_base(mut self, base: Arc<dyn Transport>) -> Self {
        self.base = Some(base);
        self
    }

    /// The preload index consulted for every request
    pub fn index(&self) -> &PreloadIndex {
        &self.index
    }

    fn base(&self) -> &dyn Transport {
        match self.base {
            Some(ref base) => base.as_ref(),
            None => default_transport(),
        }
    }
}

impl Transport for UpgradingTransport {
    fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse> {
        let req = upgrade_request(&self.index, req);
        self.base().round_trip(req)
    }
}

/// Async counterpart of [`UpgradingTransport`].
#[cfg(feature = "async")]
#[derive(Clone)]
pub struct AsyncUpgradingTransport {
    index: Arc<PreloadIndex>,
    base: Option<Arc<dyn AsyncTransport>>,
}

#[cfg(feature = "async")]
impl AsyncUpgradingTransport {
    /// Create a new AsyncUpgradingTransport delegating to [`default_transport`].
    pub fn new(index: Arc<PreloadIndex>) -> Self {
        Self { index, base: None }
    }

    /// Set the wrapped transport.
    pub fn with_base(mut self, base: Arc<dyn AsyncTransport>) -> Self {
        self.base = Some(base);
        self
    }

    /// The preload index consulted for every request
    pub fn index(&self) -> &PreloadIndex {
        &self.index
    }
}

#[cfg(feature = "async")]
#[async_trait]
impl AsyncTransport for AsyncUpgradingTransport {
    async fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse> {
        let req = upgrade_request(&self.index, req);
        match self.base {
            Some(ref base) => base.round_trip(req).await,
            None => AsyncTransport::round_trip(default_transport(), req).await,
        }
    }
}
