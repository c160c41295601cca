//! HSTS preload - static HSTS preload list lookup for Rust
//!
//! This library answers whether a hostname is on the HSTS preload list and
//! uses that answer to upgrade outgoing requests:
//! - Two-tier preload index (exact domains, domains including subdomains)
//! - ASCII-compatible (IDNA) host normalization
//! - JSON dataset loading
//! - A transport decorator that rewrites `http://` requests for preloaded
//!   hosts to `https://` before handing them to the wrapped transport
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hsts_preload::{HttpRequest, HttpResponse, MemoryPreloadLoader, PreloadLoader};
//! use hsts_preload::{Result, Transport, UpgradingTransport};
//!
//! // Build the index once at startup
//! let mut loader = MemoryPreloadLoader::new();
//! loader.add_inclusive("preloaded.example");
//! loader.add_exact("exact.example");
//! let index = Arc::new(loader.load().unwrap());
//!
//! assert!(index.is_preloaded("www.preloaded.example"));
//! assert!(!index.is_preloaded("www.exact.example"));
//!
//! // Any transport can be wrapped
//! struct Echo;
//!
//! impl Transport for Echo {
//!     fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse> {
//!         Ok(http::Response::new(req.uri().to_string().into_bytes()))
//!     }
//! }
//!
//! let transport = UpgradingTransport::new(index).with_base(Arc::new(Echo));
//! let req = http::Request::get("http://preloaded.example/").body(Vec::new()).unwrap();
//! let resp = transport.round_trip(req).unwrap();
//! assert_eq!(resp.body().as_slice(), b"https://preloaded.example/");
//! ```
//!
//! # Lookup rules
//!
//! | Host | Exact entry `a.example` | Inclusive entry `b.example` |
//! |------|-------------------------|-----------------------------|
//! | `a.example` | preloaded | - |
//! | `www.a.example` | not preloaded | - |
//! | `b.example` | - | preloaded |
//! | `x.y.b.example` | - | preloaded |
//!
//! Matching ignores case and a single trailing dot. Hosts with more than
//! four labels are cut down to their last four before the inclusive tier is
//! consulted, and never match the exact tier.

pub mod error;
pub mod normalize;
pub mod preload;
pub mod transport;

// Re-export commonly used items
pub use error::{HstsError, PreloadErrorKind, Result, TransportErrorKind};
pub use normalize::{AsciiNormalizer, HostNormalizer, IdnaNormalizer};
pub use preload::{
    suffixes, FilePreloadLoader, MemoryPreloadLoader, PreloadEntry, PreloadFile, PreloadIndex,
    PreloadLoader, Suffixes, MAX_EXACT_LABELS,
};

// Re-export transport types
pub use transport::{
    default_transport, upgrade_request, upgrade_uri, Direct, DirectOptions, HttpRequest,
    HttpResponse, Transport, UpgradingTransport, DEFAULT_MAX_BODY_SIZE, DEFAULT_TIMEOUT,
};

#[cfg(feature = "async")]
pub use transport::{AsyncTransport, AsyncUpgradingTransport};
