//! Loading of `.hit` files from a directory.

use std::path::{Path, PathBuf};

use quiver_domain::HitFile;
use thiserror::Error;
use tokio::fs;

use super::{ParseError, parse};

/// Errors from loading definition files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file or directory could not be read.
    #[error("read '{path}': {message}")]
    Io {
        /// The path that failed.
        path: String,
        /// OS diagnostic.
        message: String,
    },

    /// A definition file failed to parse.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        /// The file the error belongs to.
        path: String,
        /// The underlying parse error, with its line number.
        source: ParseError,
    },
}

/// Loads every `*.hit` file in `dir`, sorted by file name so the merge
/// order is deterministic.
///
/// # Errors
///
/// `Io` when the directory or a file cannot be read, `Parse` (with the
/// offending file attributed) when any file is malformed.
pub async fn load_dir(dir: &Path) -> Result<Vec<HitFile>, LoadError> {
    let io_err = |path: &Path, e: &std::io::Error| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    let mut entries = fs::read_dir(dir).await.map_err(|e| io_err(dir, &e))?;
    while let Some(entry) = entries.next_entry().await.map_err(|e| io_err(dir, &e))? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "hit") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path)
            .await
            .map_err(|e| io_err(&path, &e))?;
        let parsed = parse(&text).map_err(|source| LoadError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(
            file = %path.display(),
            requests = parsed.requests.len(),
            "parsed definition file"
        );
        files.push(parsed);
    }
    Ok(files)
}
