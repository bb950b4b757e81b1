//! Request catalog across all loaded definition files.

use std::collections::BTreeSet;

use quiver_domain::{HitFile, RequestDef};

use crate::globals::ConfigError;

/// An index of every request definition in the loaded file set.
///
/// Duplicate IDs across files are rejected at construction instead of
/// silently shadowing one another.
#[derive(Debug, Clone, Default)]
pub struct RequestCatalog {
    requests: Vec<RequestDef>,
}

impl RequestCatalog {
    /// Collects the requests of `files` in file order.
    ///
    /// # Errors
    ///
    /// `ConfigError::DuplicateRequestId` when the same ID appears twice
    /// anywhere in the set.
    pub fn from_files(files: &[HitFile]) -> Result<Self, ConfigError> {
        let mut seen = BTreeSet::new();
        let mut requests = Vec::new();
        for file in files {
            for request in &file.requests {
                if !seen.insert(request.id.clone()) {
                    return Err(ConfigError::DuplicateRequestId(request.id.clone()));
                }
                requests.push(request.clone());
            }
        }
        Ok(Self { requests })
    }

    /// Looks up a request definition by ID (without the leading `@`).
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&RequestDef> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Iterates over all known request IDs, in definition order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.requests.iter().map(|r| r.id.as_str())
    }

    /// Returns the number of definitions in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns whether the catalog holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
