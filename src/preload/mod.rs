//! HSTS preload list membership.
//!
//! The dataset has two tiers:
//! - exact domains, which cover only the listed name
//! - inclusive domains, which cover the listed name and every subdomain
//!
//! ## Example
//!
//! ```
//! use hsts_preload::PreloadIndex;
//!
//! let exact = vec!["exact.example".to_string()];
//! let inclusive = vec!["example.org".to_string()];
//! let index = PreloadIndex::new(&exact, &inclusive);
//!
//! assert!(index.is_preloaded("exact.example"));
//! assert!(!index.is_preloaded("www.exact.example"));
//! assert!(index.is_preloaded("WWW.Example.ORG."));
//! ```

mod loader;

pub use loader::{
    parse_entries, FilePreloadLoader, MemoryPreloadLoader, PreloadEntry, PreloadFile,
    PreloadLoader,
};

use std::collections::HashSet;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::normalize::{nth_last_index_of, HostNormalizer, IdnaNormalizer};

/// Hosts with more labels than this are truncated before the suffix walk,
/// and skip the exact tier entirely.
pub const MAX_EXACT_LABELS: usize = 4;

/// Immutable two-tier preload index.
#[derive(Clone)]
pub struct PreloadIndex {
    /// Domains covered by name only
    exact: HashSet<String>,
    /// Domains covering themselves and all subdomains
    inclusive: HashSet<String>,
    normalizer: Arc<dyn HostNormalizer>,
}

impl fmt::Debug for PreloadIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadIndex")
            .field("exact", &self.exact.len())
            .field("inclusive", &self.inclusive.len())
            .finish()
    }
}

impl Default for PreloadIndex {
    fn default() -> Self {
        Self::new(&[], &[])
    }
}

impl PreloadIndex {
    /// Create an index from the two domain tiers using IDNA normalization.
    pub fn new(exact: &[String], inclusive: &[String]) -> Self {
        Self::with_normalizer(Arc::new(IdnaNormalizer), exact, inclusive)
    }

    /// Create an index with a custom host normalizer.
    ///
    /// Keys go through the same normalization as lookups (trailing dot,
    /// ASCII conversion, lowercase). Keys that fail to normalize are skipped,
    /// as are keys in either tier with more than [`MAX_EXACT_LABELS`] labels:
    /// lookups truncate hosts to that many labels, so such keys are
    /// unreachable.
    pub fn with_normalizer(
        normalizer: Arc<dyn HostNormalizer>,
        exact: &[String],
        inclusive: &[String],
    ) -> Self {
        let exact_set = collect_keys(normalizer.as_ref(), exact, "exact");
        let inclusive_set = collect_keys(normalizer.as_ref(), inclusive, "inclusive");

        Self {
            exact: exact_set,
            inclusive: inclusive_set,
            normalizer,
        }
    }

    /// Create an index from dataset entries using IDNA normalization.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a PreloadEntry>) -> Self {
        Self::from_entries_with_normalizer(Arc::new(IdnaNormalizer), entries)
    }

    /// Create an index from dataset entries with a custom host normalizer.
    pub fn from_entries_with_normalizer<'a>(
        normalizer: Arc<dyn HostNormalizer>,
        entries: impl IntoIterator<Item = &'a PreloadEntry>,
    ) -> Self {
        let (inclusive, exact): (Vec<&PreloadEntry>, Vec<&PreloadEntry>) = entries
            .into_iter()
            .partition(|entry| entry.include_subdomains);
        let exact: Vec<String> = exact.into_iter().map(|e| e.name.clone()).collect();
        let inclusive: Vec<String> = inclusive.into_iter().map(|e| e.name.clone()).collect();
        Self::with_normalizer(normalizer, &exact, &inclusive)
    }

    /// Reports whether `host` is on the preload list.
    ///
    /// Never fails: hosts that cannot be normalized are simply not preloaded.
    pub fn is_preloaded(&self, host: &str) -> bool {
        let host = host.strip_suffix('.').unwrap_or(host);
        let host = match self.normalizer.to_ascii(host) {
            Some(ascii) if !ascii.is_empty() => ascii.to_ascii_lowercase(),
            _ => return false,
        };

        // Bound the walk to the last MAX_EXACT_LABELS labels. Only hosts that
        // are short enough to avoid truncation can hit the exact tier.
        let candidate = match nth_last_index_of(&host, b'.', MAX_EXACT_LABELS) {
            Some(extra_dot) => &host[extra_dot..],
            None => {
                if self.exact.contains(host.as_str()) {
                    return true;
                }
                host.as_str()
            }
        };

        suffixes(candidate).any(|suffix| self.inclusive.contains(suffix))
    }

    /// Number of exact-tier domains
    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    /// Number of inclusive-tier domains
    pub fn inclusive_len(&self) -> usize {
        self.inclusive.len()
    }

    /// Total number of entries across both tiers
    pub fn len(&self) -> usize {
        self.exact.len() + self.inclusive.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.inclusive.is_empty()
    }
}

/// Normalize one tier's keys, dropping the unusable ones.
fn collect_keys(
    normalizer: &dyn HostNormalizer,
    domains: &[String],
    tier: &str,
) -> HashSet<String> {
    let mut keys = HashSet::with_capacity(domains.len());
    for domain in domains {
        let Some(key) = normalize_key(normalizer, domain) else {
            log::warn!("skipping invalid {} preload entry {:?}", tier, domain);
            continue;
        };
        if key.split('.').count() > MAX_EXACT_LABELS {
            log::warn!(
                "skipping {} preload entry {:?}: more than {} labels",
                tier,
                domain,
                MAX_EXACT_LABELS
            );
            continue;
        }
        keys.insert(key);
    }
    keys
}

fn normalize_key(normalizer: &dyn HostNormalizer, domain: &str) -> Option<String> {
    let domain = domain.trim();
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let ascii = normalizer.to_ascii(domain)?;
    if ascii.is_empty() {
        return None;
    }
    Some(ascii.to_ascii_lowercase())
}

/// Iterate over `host` and every suffix obtained by dropping leading labels.
///
/// `"a.b.c"` yields `"a.b.c"`, `"b.c"`, `"c"`.
pub fn suffixes(host: &str) -> Suffixes<'_> {
    Suffixes { rest: Some(host) }
}

/// Iterator returned by [`suffixes`].
#[derive(Debug, Clone)]
pub struct Suffixes<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for Suffixes<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let current = self.rest?;
        self.rest = current.find('.').map(|dot| &current[dot + 1..]);
        Some(current)
    }
}

impl FusedIterator for Suffixes<'_> {}
