//! On-disk cache store for response envelopes.
//!
//! Each cache entry is one JSON document holding the response payload and
//! its headers. A missing file is a normal empty result, not an error;
//! anything else that prevents reading or parsing an entry surfaces as a
//! [`CacheError::Read`] so callers can distinguish a clean miss from a
//! damaged cache.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// One cached response: opaque payload plus lowercase response headers.
///
/// Immutable once written. A refresh overwrites the whole envelope; entries
/// are never merged in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// Response payload, kept opaque at the cache layer.
    pub data: Value,
    /// Response headers, lowercase name to value.
    pub headers: BTreeMap<String, String>,
}

impl CachedResponse {
    /// Creates an envelope from a payload and an iterator of header pairs.
    ///
    /// Header names are lowercased so later lookups are case-insensitive.
    pub fn new<I, K, V>(data: Value, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();
        Self { data, headers }
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Errors from cache store operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache file exists but could not be read or parsed.
    #[error("error reading cache file {path}: {source}")]
    Read {
        /// Path of the unreadable entry.
        path: PathBuf,
        /// Underlying IO or JSON failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cache entry could not be written.
    #[error("cache write error: {path}: {source}")]
    Write {
        /// Path of the entry that failed to persist.
        path: PathBuf,
        /// Underlying IO or JSON failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CacheError {
    fn read(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Read {
            path: path.into(),
            source: Box::new(source),
        }
    }

    fn write(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Write {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// Reads, writes, and deletes cached response envelopes on disk.
///
/// The store owns the file format; deciding *when* entries are read,
/// written, or deleted is the retrieval layer's job. There is no
/// cross-process locking: concurrent writers to the same key from separate
/// processes are an accepted single-writer limitation.
#[derive(Debug, Clone, Default)]
pub struct CacheStore;

impl CacheStore {
    /// Creates a new store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reads the cache entry at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Read`] when the file exists but cannot be read
    /// or parsed.
    pub async fn get(&self, path: &Path) -> Result<Option<CachedResponse>, CacheError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "cache miss");
                return Ok(None);
            }
            Err(e) => return Err(CacheError::read(path, e)),
        };

        let response =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::read(path, e))?;
        debug!(path = %path.display(), "cache hit");
        Ok(Some(response))
    }

    /// Writes `response` to `path`, creating parent directories as needed.
    ///
    /// The entry is written to a temporary sibling file and renamed into
    /// place, so a concurrent reader never observes a partial write.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Write`] if serialization or any filesystem
    /// step fails.
    pub async fn put(&self, path: &Path, response: &CachedResponse) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::write(path, e))?;
        }

        let json = serde_json::to_vec(response).map_err(|e| CacheError::write(path, e))?;

        let tmp_path = path.with_extension("tmp");
        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|e| CacheError::write(path, e))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| CacheError::write(path, e))?;

        debug!(path = %path.display(), bytes = json.len(), "cache entry written");
        Ok(())
    }

    /// Deletes the cache entry at `path`. Deleting an absent entry is Ok.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Write`] for failures other than "not found".
    pub async fn delete(&self, path: &Path) -> Result<(), CacheError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::write(path, e)),
        }
    }

    /// Empties the cache directory, recreating it afterwards.
    ///
    /// Used for cache invalidation workflows, not in the request path. A
    /// missing directory is Ok.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Write`] if removal or recreation fails.
    pub async fn clear(&self, directory: &Path) -> Result<(), CacheError> {
        match tokio::fs::remove_dir_all(directory).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(CacheError::write(directory, e)),
        }
        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|e| CacheError::write(directory, e))?;
        debug!(directory = %directory.display(), "cache cleared");
        Ok(())
    }
}
