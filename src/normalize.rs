//! Host normalization.
//!
//! Converts hostnames to their ASCII-compatible form before they are used as
//! preload keys or lookup candidates.

use url::Host;

/// Converts a hostname to its ASCII-compatible form.
///
/// `None` (or an empty string) means the host could not be converted and
/// must be treated as not preloaded.
pub trait HostNormalizer: Send + Sync {
    fn to_ascii(&self, host: &str) -> Option<String>;
}

/// UTS-46 / punycode normalizer (default).
///
/// Parses with URL host rules, which go beyond a bare punycode conversion:
/// percent-escapes are decoded first (`ex%41mple.com` becomes `example.com`),
/// hosts whose last label is numeric are read as IPv4 in any WHATWG form and
/// come back dotted (`0x7f.1` becomes `127.0.0.1`), and forbidden host
/// characters are rejected. Domains come back lowercased and punycode-encoded.
/// IPv6 literals are rejected since they never name a preloaded host.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdnaNormalizer;

impl HostNormalizer for IdnaNormalizer {
    fn to_ascii(&self, host: &str) -> Option<String> {
        if host.is_empty() {
            return None;
        }
        match Host::parse(host) {
            Ok(Host::Domain(domain)) => Some(domain),
            Ok(Host::Ipv4(ip)) => Some(ip.to_string()),
            Ok(Host::Ipv6(_)) | Err(_) => None,
        }
    }
}

/// Passes pure-ASCII hosts through untouched and rejects everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiNormalizer;

impl HostNormalizer for AsciiNormalizer {
    fn to_ascii(&self, host: &str) -> Option<String> {
        if host.is_empty() || !host.is_ascii() {
            return None;
        }
        Some(host.to_string())
    }
}

/// Byte index of the `n`-th occurrence of `b` counting from the end of `s`.
pub fn nth_last_index_of(s: &str, b: u8, n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    s.bytes()
        .enumerate()
        .rev()
        .filter(|&(_, c)| c == b)
        .nth(n - 1)
        .map(|(i, _)| i)
}
