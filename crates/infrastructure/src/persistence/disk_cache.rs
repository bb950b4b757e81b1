//! Disk-backed response cache.
//!
//! One JSON file in the platform cache directory maps request IDs to the
//! most recent JSON response body recorded for them:
//!
//! - Linux/macOS: `~/.cache/quiver/cache.json` (XDG rules apply)
//! - Windows: `%LOCALAPPDATA%/quiver/cache.json`
//!
//! The whole map lives in memory during an invocation; `flush` writes it
//! back once before exit. Concurrent invocations writing the same ID
//! race last-write-wins.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use quiver_application::ports::cache::{CacheError, ResponseCache};
use quiver_domain::{Hit, Scalar};
use serde_json::Value;
use tokio::fs;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Response cache stored as a single JSON file.
#[derive(Debug, Clone)]
pub struct DiskCache {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl DiskCache {
    /// Returns the quiver cache directory, if the platform has one.
    #[must_use]
    pub fn cache_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("quiver"))
    }

    /// Loads the cache from the default platform location.
    ///
    /// # Errors
    ///
    /// `Storage` when no cache directory can be determined or the file
    /// cannot be read.
    pub async fn load_default() -> Result<Self, CacheError> {
        let dir = Self::cache_dir()
            .ok_or_else(|| CacheError::Storage("could not determine cache directory".to_string()))?;
        Self::load_from(dir.join("cache.json")).await
    }

    /// Loads the cache from `path`. A missing or empty file is an empty
    /// cache.
    ///
    /// # Errors
    ///
    /// `Storage` when the file exists but cannot be read or decoded.
    pub async fn load_from(path: PathBuf) -> Result<Self, CacheError> {
        let entries = match fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => from_json_bytes(&bytes)
                .map_err(|e| CacheError::Storage(format!("decode {}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(CacheError::Storage(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "loaded response cache");
        Ok(Self { path, entries })
    }

    /// Returns the file this cache flushes to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ResponseCache for DiskCache {
    fn get(&self, path: &str) -> Result<Scalar, CacheError> {
        let mut segments = path.split('.');
        let id = segments.next().unwrap_or_default();
        let Some(doc) = self.entries.get(id) else {
            return Err(CacheError::RequestIdNotFound(id.to_string()));
        };

        let mut current = doc;
        for segment in segments {
            current = match current {
                Value::Object(map) => map
                    .get(segment)
                    .ok_or_else(|| CacheError::PathNotFound(path.to_string()))?,
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index))
                    .ok_or_else(|| CacheError::PathNotFound(path.to_string()))?,
                _ => return Err(CacheError::PathNotFound(path.to_string())),
            };
        }

        match Scalar::from_json(current) {
            // null is indistinguishable from an absent key
            Some(Scalar::Null) => Err(CacheError::PathNotFound(path.to_string())),
            Some(scalar) => Ok(scalar),
            None => Err(CacheError::NotAScalar(path.to_string())),
        }
    }

    fn save(&mut self, hit: Hit) -> Result<(), CacheError> {
        if !hit.has_json_response() {
            tracing::debug!(id = %hit.request_id, "response is not JSON, not caching");
            return Ok(());
        }
        let body: Value =
            serde_json::from_slice(&hit.response.body).map_err(|e| CacheError::InvalidJsonBody {
                id: hit.request_id.clone(),
                message: e.to_string(),
            })?;
        self.entries.insert(hit.request_id, body);
        Ok(())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::Storage(format!("create {}: {e}", parent.display())))?;
        }
        let bytes = to_json_stable_bytes(&self.entries)
            .map_err(|e| CacheError::Storage(format!("flush cache: {e}")))?;
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| CacheError::Storage(format!("write {}: {e}", self.path.display())))?;
        tracing::debug!(path = %self.path.display(), "flushed response cache");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use quiver_domain::{Header, Method, RequestSpec, ResponseSpec};

    fn hit(id: &str, content_type: &str, body: &[u8]) -> Hit {
        let spec = RequestSpec {
            method: Method::new("get").unwrap(),
            scheme: "https".to_string(),
            host: "example.com".to_string(),
            path: "/".to_string(),
            query_string: String::new(),
            headers: Vec::new(),
            body: None,
        };
        let response = ResponseSpec::new(
            200,
            vec![Header::new("content-type", content_type)],
            body.to_vec(),
        );
        Hit::from_exchange(id, &spec, &response, Utc::now())
    }

    async fn empty_cache() -> (tempfile::TempDir, DiskCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::load_from(dir.path().join("cache.json"))
            .await
            .unwrap();
        (dir, cache)
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_cache() {
        let (_dir, cache) = empty_cache().await;
        assert_eq!(
            cache.get("anything.id").unwrap_err(),
            CacheError::RequestIdNotFound("anything".to_string())
        );
    }

    #[tokio::test]
    async fn saves_and_resolves_dotted_paths() {
        let (_dir, mut cache) = empty_cache().await;
        cache
            .save(hit(
                "createUser",
                "application/json; charset=utf-8",
                br#"{"id": 7, "name": "alice", "tags": ["a", "b"], "meta": {"active": true}}"#,
            ))
            .unwrap();

        assert_eq!(cache.get("createUser.id").unwrap(), Scalar::Integer(7));
        assert_eq!(
            cache.get("createUser.name").unwrap(),
            Scalar::String("alice".to_string())
        );
        assert_eq!(
            cache.get("createUser.tags.1").unwrap(),
            Scalar::String("b".to_string())
        );
        assert_eq!(
            cache.get("createUser.meta.active").unwrap(),
            Scalar::Boolean(true)
        );
    }

    #[tokio::test]
    async fn lookup_error_taxonomy() {
        let (_dir, mut cache) = empty_cache().await;
        cache
            .save(hit(
                "req",
                "application/json",
                br#"{"meta": {"x": 1}, "gone": null, "tags": [1]}"#,
            ))
            .unwrap();

        assert_eq!(
            cache.get("other.id").unwrap_err(),
            CacheError::RequestIdNotFound("other".to_string())
        );
        assert_eq!(
            cache.get("req.missing").unwrap_err(),
            CacheError::PathNotFound("req.missing".to_string())
        );
        assert_eq!(
            cache.get("req.meta").unwrap_err(),
            CacheError::NotAScalar("req.meta".to_string())
        );
        assert_eq!(
            cache.get("req.gone").unwrap_err(),
            CacheError::PathNotFound("req.gone".to_string())
        );
        assert_eq!(
            cache.get("req.tags.9").unwrap_err(),
            CacheError::PathNotFound("req.tags.9".to_string())
        );
        assert_eq!(
            cache.get("req.meta.x.deeper").unwrap_err(),
            CacheError::PathNotFound("req.meta.x.deeper".to_string())
        );
    }

    #[tokio::test]
    async fn non_json_responses_are_silently_skipped() {
        let (_dir, mut cache) = empty_cache().await;
        cache.save(hit("page", "text/html", b"<html/>")).unwrap();
        assert_eq!(
            cache.get("page.title").unwrap_err(),
            CacheError::RequestIdNotFound("page".to_string())
        );
    }

    #[tokio::test]
    async fn invalid_json_body_is_an_error() {
        let (_dir, mut cache) = empty_cache().await;
        let err = cache
            .save(hit("bad", "application/json", b"{not json"))
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidJsonBody { id, .. } if id == "bad"));
    }

    #[tokio::test]
    async fn newer_hits_replace_older_ones() {
        let (_dir, mut cache) = empty_cache().await;
        cache
            .save(hit("req", "application/json", br#"{"id": 1}"#))
            .unwrap();
        cache
            .save(hit("req", "application/json", br#"{"id": 2}"#))
            .unwrap();
        assert_eq!(cache.get("req.id").unwrap(), Scalar::Integer(2));
    }

    #[tokio::test]
    async fn flush_persists_across_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let mut cache = DiskCache::load_from(path.clone()).await.unwrap();
        cache
            .save(hit("req", "application/json", br#"{"token": "abc"}"#))
            .unwrap();
        cache.flush().await.unwrap();

        let reloaded = DiskCache::load_from(path).await.unwrap();
        assert_eq!(
            reloaded.get("req.token").unwrap(),
            Scalar::String("abc".to_string())
        );
    }
}
