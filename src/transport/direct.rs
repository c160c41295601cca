//! Direct transport implementation.
//!
//! Sends requests straight to their target with a `ureq` agent.

use std::time::Duration;

use http::{Request, Response};
use ureq::Agent;

use crate::error::{HstsError, Result, TransportErrorKind};

use super::{HttpRequest, HttpResponse, Transport};

#[cfg(feature = "async")]
use super::AsyncTransport;
#[cfg(feature = "async")]
use async_trait::async_trait;

/// Default overall request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default response body size limit: 10 MiB
pub const DEFAULT_MAX_BODY_SIZE: u64 = 10 * 1024 * 1024;

/// Options for creating a Direct transport.
#[derive(Debug, Clone)]
pub struct DirectOptions {
    /// Overall timeout per request, `None` to wait forever
    pub timeout: Option<Duration>,
    /// Maximum response body size in bytes
    pub max_body_size: u64,
}

impl Default for DirectOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Direct transport that sends requests to their target.
///
/// Every status code comes back as a response rather than an error, and
/// redirects are returned to the caller instead of being followed.
#[derive(Clone)]
pub struct Direct {
    agent: Agent,
    max_body_size: u64,
}

impl Direct {
    /// Create a new Direct transport with default settings.
    pub fn new() -> Self {
        Self::with_options(DirectOptions::default())
    }

    /// Create a new Direct transport with the given options.
    pub fn with_options(opts: DirectOptions) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .timeout_global(opts.timeout)
            .build();

        Self {
            agent: Agent::new_with_config(config),
            max_body_size: opts.max_body_size,
        }
    }

    /// Maximum response body size in bytes
    pub fn max_body_size(&self) -> u64 {
        self.max_body_size
    }
}

impl Default for Direct {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for Direct {
    fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse> {
        let (parts, body) = req.into_parts();

        // Empty bodies go out as no body at all.
        let result = if body.is_empty() {
            self.agent.run(Request::from_parts(parts, ()))
        } else {
            self.agent.run(Request::from_parts(parts, body))
        };
        let response = result.map_err(transport_error)?;

        let (parts, mut body) = response.into_parts();
        let bytes = body
            .with_config()
            .limit(self.max_body_size)
            .read_to_vec()
            .map_err(transport_error)?;

        Ok(Response::from_parts(parts, bytes))
    }
}

#[cfg(feature = "async")]
#[async_trait]
impl AsyncTransport for Direct {
    async fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse> {
        let direct = self.clone();
        tokio::task::spawn_blocking(move || Transport::round_trip(&direct, req))
            .await
            .map_err(|e| {
                HstsError::transport(TransportErrorKind::Io, format!("Request task failed: {}", e))
            })?
    }
}

fn transport_error(err: ureq::Error) -> HstsError {
    let kind = match &err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound => TransportErrorKind::DnsFailed,
        ureq::Error::ConnectionFailed => TransportErrorKind::ConnectionFailed,
        ureq::Error::Io(_) => TransportErrorKind::Io,
        ureq::Error::BodyExceedsLimit(_) => TransportErrorKind::BodyTooLarge,
        ureq::Error::BadUri(_) => TransportErrorKind::InvalidInput,
        _ => TransportErrorKind::Protocol,
    };
    HstsError::transport(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// What the test server saw.
    struct Served {
        /// Raw request head and body
        request: String,
        /// Connections accepted after the first one was answered
        extra_connections: usize,
    }

    /// Read one request head plus its `content-length` body.
    fn read_request(stream: &mut impl Read) -> Vec<u8> {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        let head_end = loop {
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                return raw;
            }
            raw.extend_from_slice(&buf[..n]);
        };

        let head = String::from_utf8_lossy(&raw[..head_end]).to_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while raw.len() < head_end + body_len {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        raw
    }

    /// Answer the first connection with a canned response, then keep
    /// listening briefly to count any follow-up connections.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<Served>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            listener.set_nonblocking(true).unwrap();
            let mut extra_connections = 0;
            for _ in 0..20 {
                if listener.accept().is_ok() {
                    extra_connections += 1;
                }
                thread::sleep(Duration::from_millis(10));
            }

            Served {
                request: String::from_utf8_lossy(&request).into_owned(),
                extra_connections,
            }
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_direct_options_default() {
        let opts = DirectOptions::default();
        assert_eq!(opts.timeout, Some(DEFAULT_TIMEOUT));
        assert_eq!(opts.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }

    #[test]
    fn test_direct_with_options() {
        let direct = Direct::with_options(DirectOptions {
            timeout: Some(Duration::from_secs(5)),
            max_body_size: 1024,
        });
        assert_eq!(direct.max_body_size(), 1024);
    }

    #[test]
    fn test_direct_round_trip() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nX-Served: yes\r\nConnection: close\r\n\r\nhello",
        );

        let req = http::Request::get(format!("{}/hello", base))
            .header("x-client", "hsts")
            .body(Vec::new())
            .unwrap();
        let resp = Transport::round_trip(&Direct::new(), req).unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers().get("x-served").unwrap(), "yes");
        assert_eq!(resp.body(), b"hello");

        let head = server.join().unwrap().request;
        assert!(head.starts_with("GET /hello HTTP/1.1\r\n"), "got: {}", head);
        assert!(head.to_lowercase().contains("x-client: hsts"), "got: {}", head);
        // Empty body goes out as no body
        assert!(!head.to_lowercase().contains("content-length"), "got: {}", head);
    }

    #[test]
    fn test_direct_sends_body() {
        let (base, server) = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );

        let req = http::Request::post(format!("{}/submit", base))
            .body(b"payload".to_vec())
            .unwrap();
        let resp = Transport::round_trip(&Direct::new(), req).unwrap();
        assert_eq!(resp.status(), http::StatusCode::CREATED);

        let request = server.join().unwrap().request;
        assert!(request.starts_with("POST /submit HTTP/1.1\r\n"), "got: {}", request);
        assert!(
            request.to_lowercase().contains("content-length: 7\r\n"),
            "got: {}",
            request
        );
        assert!(request.ends_with("\r\n\r\npayload"), "got: {}", request);
    }

    #[test]
    fn test_direct_does_not_follow_redirects() {
        let (base, server) = serve_once(
            "HTTP/1.1 301 Moved Permanently\r\nLocation: /elsewhere\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );

        let req = http::Request::get(format!("{}/old", base))
            .body(Vec::new())
            .unwrap();
        let resp = Transport::round_trip(&Direct::new(), req).unwrap();
        assert_eq!(resp.status(), http::StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers().get("location").unwrap(), "/elsewhere");

        let served = server.join().unwrap();
        assert!(served.request.starts_with("GET /old HTTP/1.1\r\n"));
        assert_eq!(served.extra_connections, 0);
    }

    #[test]
    fn test_direct_error_status_is_response() {
        let (base, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );

        let req = http::Request::get(format!("{}/missing", base))
            .body(Vec::new())
            .unwrap();
        let resp = Transport::round_trip(&Direct::new(), req).unwrap();
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert!(resp.body().is_empty());

        server.join().unwrap();
    }

    #[test]
    fn test_direct_body_limit() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 10\r\nConnection: close\r\n\r\n0123456789",
        );

        let direct = Direct::with_options(DirectOptions {
            timeout: Some(Duration::from_secs(5)),
            max_body_size: 4,
        });
        let req = http::Request::get(base).body(Vec::new()).unwrap();
        let err = Transport::round_trip(&direct, req).unwrap_err();
        assert!(matches!(err, HstsError::TransportError { .. }), "got: {}", err);

        server.join().unwrap();
    }

    #[test]
    fn test_direct_connection_refused() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let direct = Direct::with_options(DirectOptions {
            timeout: Some(Duration::from_secs(5)),
            ..DirectOptions::default()
        });
        let req = http::Request::get(format!("http://{}/", addr))
            .body(Vec::new())
            .unwrap();
        let err = Transport::round_trip(&direct, req).unwrap_err();
        assert!(matches!(err, HstsError::TransportError { .. }), "got: {}", err);
    }
}
