//! Merging and validation of `@_global` sections.
//!
//! Any number of definition files may carry a global section; they are
//! merged in file order with first-wins semantics and then validated as
//! a whole.

use std::collections::BTreeMap;

use quiver_domain::HitFile;
use thiserror::Error;
use url::Url;

/// Errors from global-section merging and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two files declare different non-zero versions.
    #[error("conflicting definition-file versions: {first} and {second}")]
    VersionConflict {
        /// Version adopted first.
        first: u32,
        /// Conflicting version seen later.
        second: u32,
    },

    /// No file declares a version.
    #[error("no global.version provided")]
    MissingVersion,

    /// The declared version is not understood.
    #[error("invalid definition-file version '{0}': only version 1 is supported")]
    UnsupportedVersion(u32),

    /// No file declares a base URL.
    #[error("no global.baseURL provided")]
    MissingBaseUrl,

    /// The base URL does not parse as an absolute URL.
    #[error("invalid baseURL '{url}': {message}")]
    InvalidBaseUrl {
        /// The offending URL text.
        url: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The base URL has a scheme other than `http` or `https`.
    #[error("invalid scheme '{0}': only 'http' or 'https' is supported")]
    InvalidScheme(String),

    /// The same request ID appears in more than one definition.
    #[error("duplicate request id '@{0}'")]
    DuplicateRequestId(String),
}

/// The merged, validated global configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Globals {
    /// Absolute base URL every request path is joined onto.
    pub base_url: Url,
    /// Default headers; a request's own headers override these.
    pub headers: BTreeMap<String, String>,
}

/// Merges the global sections of `files` in order and validates the
/// result.
///
/// Merge rules: the first non-zero version is adopted and later
/// differing non-zero versions conflict; the first non-empty base URL
/// wins; headers are unioned with first-file-wins on key conflicts.
///
/// # Errors
///
/// `VersionConflict`, `MissingVersion` or `UnsupportedVersion` for
/// version problems; `MissingBaseUrl`, `InvalidBaseUrl` or
/// `InvalidScheme` for base-URL problems.
pub fn resolve_globals(files: &[HitFile]) -> Result<Globals, ConfigError> {
    let mut version = 0u32;
    let mut base_url = String::new();
    let mut headers = BTreeMap::new();

    for file in files {
        let global = &file.global;
        if global.version != 0 {
            if version == 0 {
                version = global.version;
            } else if version != global.version {
                return Err(ConfigError::VersionConflict {
                    first: version,
                    second: global.version,
                });
            }
        }
        if base_url.is_empty() && !global.base_url.is_empty() {
            base_url = global.base_url.clone();
        }
        for (name, value) in &global.headers {
            headers
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }

    match version {
        0 => return Err(ConfigError::MissingVersion),
        1 => {}
        other => return Err(ConfigError::UnsupportedVersion(other)),
    }
    if base_url.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }

    let parsed = Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: base_url.clone(),
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::InvalidScheme(other.to_string())),
    }

    Ok(Globals {
        base_url: parsed,
        headers,
    })
}
