use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{HstsError, PreloadErrorKind, Result};
use crate::normalize::{HostNormalizer, IdnaNormalizer};

use super::PreloadIndex;

/// One domain of the preload dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadEntry {
    /// Domain name
    pub name: String,
    /// Whether every subdomain is covered as well
    #[serde(default)]
    pub include_subdomains: bool,
}

impl PreloadEntry {
    /// Create a new entry
    pub fn new(name: impl Into<String>, include_subdomains: bool) -> Self {
        Self {
            name: name.into(),
            include_subdomains,
        }
    }
}

/// On-disk layout of a compiled preload dataset.
///
/// ```json
/// { "entries": [ { "name": "example.com", "include_subdomains": true } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreloadFile {
    pub entries: Vec<PreloadEntry>,
}

/// Parse dataset entries from JSON text.
pub fn parse_entries(json: &str) -> Result<Vec<PreloadEntry>> {
    let file: PreloadFile = serde_json::from_str(json)?;
    Ok(file.entries)
}

/// Trait for loading a preload index
pub trait PreloadLoader: Send + Sync {
    /// Build the index. Called once at startup.
    fn load(&self) -> Result<PreloadIndex>;
}

/// Loads a JSON preload dataset from disk.
pub struct FilePreloadLoader {
    path: Option<PathBuf>,
    normalizer: Arc<dyn HostNormalizer>,
}

impl FilePreloadLoader {
    /// Create a new FilePreloadLoader
    pub fn new() -> Self {
        Self {
            path: None,
            normalizer: Arc::new(IdnaNormalizer),
        }
    }

    /// Set the dataset path
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set a custom host normalizer for the loaded index
    pub fn with_normalizer(mut self, normalizer: Arc<dyn HostNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }
}

impl Default for FilePreloadLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PreloadLoader for FilePreloadLoader {
    fn load(&self) -> Result<PreloadIndex> {
        let path = self.path.as_ref().ok_or_else(|| {
            HstsError::preload(PreloadErrorKind::NotConfigured, "Preload path not configured")
        })?;

        let json = fs::read_to_string(path).map_err(|e| {
            HstsError::preload(
                PreloadErrorKind::FileError,
                format!("Failed to read {}: {}", path.display(), e),
            )
        })?;

        let entries = parse_entries(&json).map_err(|e| {
            HstsError::preload(
                PreloadErrorKind::InvalidData,
                format!("Failed to parse {}: {}", path.display(), e),
            )
        })?;

        let index = PreloadIndex::from_entries_with_normalizer(self.normalizer.clone(), &entries);
        log::info!(
            "loaded preload list from {}: {} exact, {} inclusive",
            path.display(),
            index.exact_len(),
            index.inclusive_len()
        );
        Ok(index)
    }
}

/// In-memory PreloadLoader for testing and embedded datasets
pub struct MemoryPreloadLoader {
    entries: Vec<PreloadEntry>,
}

impl MemoryPreloadLoader {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a domain covered by name only
    pub fn add_exact(&mut self, name: &str) {
        self.entries.push(PreloadEntry::new(name, false));
    }

    /// Add a domain covering all of its subdomains
    pub fn add_inclusive(&mut self, name: &str) {
        self.entries.push(PreloadEntry::new(name, true));
    }
}

impl Default for MemoryPreloadLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<PreloadEntry>> for MemoryPreloadLoader {
    fn from(entries: Vec<PreloadEntry>) -> Self {
        Self { entries }
    }
}

impl PreloadLoader for MemoryPreloadLoader {
    fn load(&self) -> Result<PreloadIndex> {
        let index = PreloadIndex::from_entries(&self.entries);
        log::info!(
            "loaded in-memory preload list: {} exact, {} inclusive",
            index.exact_len(),
            index.inclusive_len()
        );
        Ok(index)
    }
}
