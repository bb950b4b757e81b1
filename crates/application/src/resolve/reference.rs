//! `@token` resolution.
//!
//! A reference denotes either a positional command-line argument
//! (`@1`, `@2`, …) or a dotted lookup into a previously cached JSON
//! response (`@createUser.id`). Resolution is typed: the caller receives
//! a [`Scalar`], never a stringified rendering.

use quiver_domain::Scalar;
use thiserror::Error;

use crate::ports::cache::{CacheError, ResponseCache};

/// Errors from reference resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// The token is a bare `@` with nothing after it.
    #[error("invalid reference '@'")]
    EmptyReference,

    /// `@0` — position 0 is the program name and never addressable.
    #[error("positional argument must be greater than 0")]
    ZeroPositionalArg,

    /// The referenced position is beyond the supplied arguments.
    #[error("cannot find command-line argument number '@{index}': {available} argument(s) given")]
    PositionalArgOutOfRange {
        /// The 1-based position that was referenced.
        index: u64,
        /// How many positional arguments were actually supplied.
        available: usize,
    },

    /// The cache lookup failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Resolves a reference token into a typed scalar.
///
/// `args` is the invocation's positional argument vector with the
/// program name at index 0. A numeric token addresses `args[n]` and
/// returns its typed coercion — unless that argument itself starts with
/// `@`, in which case its remainder is looked up as a cache path.
/// That indirection is exactly one level deep: the argument can name a
/// cache path, never another positional argument. Non-numeric tokens
/// are cache paths outright.
///
/// # Errors
///
/// See [`ReferenceError`] for the full taxonomy.
pub fn resolve_reference(
    token: &str,
    args: &[String],
    cache: &dyn ResponseCache,
) -> Result<Scalar, ReferenceError> {
    let key = token.strip_prefix('@').unwrap_or(token);
    if key.is_empty() {
        return Err(ReferenceError::EmptyReference);
    }

    if let Ok(n) = key.parse::<u64>() {
        if n == 0 {
            return Err(ReferenceError::ZeroPositionalArg);
        }
        if n >= args.len() as u64 {
            return Err(ReferenceError::PositionalArgOutOfRange {
                index: n,
                available: args.len().saturating_sub(1),
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let value = &args[n as usize];
        return match value.strip_prefix('@') {
            None => Ok(Scalar::from_literal(value)),
            Some("") => Err(ReferenceError::EmptyReference),
            Some(path) => Ok(cache.get(path)?),
        };
    }

    Ok(cache.get(key)?)
}
