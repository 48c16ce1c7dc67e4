//! Locating rule-base resources and opening their byte streams.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use tracing::debug;

use crate::error::ResourceError;

/// Resolves named resources to readable byte streams.
///
/// This is the seam for wherever rule-bases are shipped: compiled into
/// the binary, read off disk, or fetched from a store.
pub trait ResourceResolver: Send + Sync {
    /// Opens the named resource for reading.
    fn open(&self, name: &str) -> Result<Box<dyn Read + Send + '_>, ResourceError>;

    /// Returns true if the named resource exists.
    fn contains(&self, name: &str) -> bool;
}

/// In-memory catalog of named resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    resources: BTreeMap<String, Vec<u8>>,
}

impl ResourceCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every file in `dir` as a resource named by its file name.
    ///
    /// Subdirectories are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Io`] if the directory or a file in it
    /// cannot be read.
    pub fn from_dir(dir: &Path) -> Result<Self, ResourceError> {
        let mut catalog = Self::new();
        let entries = fs::read_dir(dir).map_err(|source| ResourceError::Io {
            name: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| ResourceError::Io {
                name: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let bytes = fs::read(&path).map_err(|source| ResourceError::Io {
                name: name.clone(),
                source,
            })?;
            catalog.insert(name, bytes);
        }
        Ok(catalog)
    }

    /// Adds a resource under the given name, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.resources.insert(name.into(), bytes.into());
    }

    /// Adds a resource, builder style.
    #[must_use]
    pub fn with_resource(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// The resource names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Number of resources in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if the catalog holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceResolver for ResourceCatalog {
    fn open(&self, name: &str) -> Result<Box<dyn Read + Send + '_>, ResourceError> {
        let bytes = self
            .resources
            .get(name)
            .ok_or_else(|| ResourceError::NotFound {
                name: name.to_string(),
            })?;
        Ok(Box::new(Cursor::new(bytes.as_slice())))
    }

    fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }
}

/// Locates a configured rule-base and opens its stream on demand.
///
/// The provider does not hold the bytes; every call opens a fresh
/// stream from the resolver, which the caller closes by dropping it.
#[derive(Debug, Clone)]
pub struct RulebaseProvider {
    resource_name: String,
}

impl RulebaseProvider {
    /// Creates a provider for the named resource.
    #[must_use]
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
        }
    }

    /// The resource name this provider serves.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Opens the rule-base stream from the given resolver.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the resolver does not hold
    /// the configured resource.
    pub fn open<'a>(
        &self,
        resources: &'a dyn ResourceResolver,
    ) -> Result<Box<dyn Read + Send + 'a>, ResourceError> {
        debug!(resource = %self.resource_name, "opening rule-base resource");
        resources.open(&self.resource_name)
    }
}
