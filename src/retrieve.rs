//! The cache-validation retrieval pipeline.
//!
//! Every read goes through one decision sequence that classifies the cache
//! entry for the requested slug and picks the cheapest safe source:
//!
//! | Status     | Meaning                                         | Network traffic |
//! |------------|-------------------------------------------------|-----------------|
//! | `Disabled` | Caching is off in the config                    | 1 GET           |
//! | `Miss`     | No cache entry for this slug                    | 1 GET           |
//! | `Expired`  | Entry exists but its `Expires` has passed       | 1 GET           |
//! | `Stale`    | Entry unexpired, but the remote is newer        | 1 HEAD + 1 GET  |
//! | `Valid`    | Entry unexpired and at least as new as remote   | 1 HEAD          |
//!
//! # Cache-write failures
//!
//! A response that was fetched successfully is always returned to the
//! caller, even when persisting it to disk fails. The failure is logged and
//! carried on [`Retrieval::cache_write_error`] so callers that care can
//! inspect it without the call itself failing.
//!
//! # Concurrency
//!
//! Deletion of a superseded entry always happens before the replacement
//! fetch, so a crash mid-refresh leaves a miss rather than stale data.
//! There is no cross-process locking; concurrent processes sharing a cache
//! directory may race on the same key.

use std::path::Path;
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::cache::{CacheError, CacheStore, CachedResponse, cache_file_path, is_expired, is_fresh};
use crate::config::PackageConfig;
use crate::net::{FetchError, RemoteFetcher, RemoteResponse};

/// How the cache participated in a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Caching disabled by configuration; fetched without touching disk.
    Disabled,
    /// No cache entry existed; fetched and cached.
    Miss,
    /// Entry existed but had expired; refetched without a remote probe.
    Expired,
    /// Entry was unexpired but older than the remote; refetched.
    Stale,
    /// Entry was served from cache after a successful revalidation probe.
    Valid,
}

/// The result of a retrieval: the response plus how the cache behaved.
#[derive(Debug)]
pub struct Retrieval {
    /// The response envelope, from cache or freshly fetched.
    pub response: CachedResponse,
    /// Which pipeline state produced the response.
    pub status: CacheStatus,
    /// Set when the response could not be persisted to the cache.
    pub cache_write_error: Option<CacheError>,
}

/// Errors that fail a retrieval outright.
///
/// Cache *write* failures never appear here; see
/// [`Retrieval::cache_write_error`].
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The remote fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A cache entry exists but could not be read.
    #[error(transparent)]
    CacheRead(#[from] CacheError),
}

/// Runs the retrieval pipeline over a fetcher and a cache store.
///
/// Cheap to clone and safe to share across tasks.
#[derive(Debug, Clone)]
pub struct Retriever {
    fetcher: RemoteFetcher,
    store: CacheStore,
}

impl Retriever {
    /// Creates a retriever from an already-built fetcher.
    #[must_use]
    pub fn new(fetcher: RemoteFetcher) -> Self {
        Self {
            fetcher,
            store: CacheStore::new(),
        }
    }

    /// Builds a retriever from a package configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] when the request configuration cannot
    /// produce a usable HTTP client.
    pub fn from_config(config: &PackageConfig) -> Result<Self, FetchError> {
        Ok(Self::new(RemoteFetcher::new(&config.request)?))
    }

    /// Returns the underlying fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &RemoteFetcher {
        &self.fetcher
    }

    /// Returns the underlying cache store.
    #[must_use]
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Retrieves the response for `slug`, consulting the cache per `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::Fetch`] when a required network request
    /// fails, or [`RetrieveError::CacheRead`] when an existing cache entry
    /// cannot be read.
    #[instrument(skip(self, config), fields(slug = %slug))]
    pub async fn retrieve(
        &self,
        slug: &str,
        config: &PackageConfig,
    ) -> Result<Retrieval, RetrieveError> {
        if !config.cache.enable_local_cache {
            debug!("cache disabled, fetching directly");
            let response = self.fetcher.fetch_body(slug).await?;
            return Ok(Retrieval {
                response: into_envelope(response),
                status: CacheStatus::Disabled,
                cache_write_error: None,
            });
        }

        let path = cache_file_path(&config.cache.cache_directory, slug);

        let Some(cached) = self.store.get(&path).await? else {
            return Ok(self.refresh(slug, &path, CacheStatus::Miss).await?);
        };

        if is_expired(&cached, SystemTime::now()) {
            debug!("cache entry expired");
            return Ok(self.refresh(slug, &path, CacheStatus::Expired).await?);
        }

        let probe = self.fetcher.fetch_meta(slug).await?;
        if is_fresh(&cached, &probe.headers) {
            debug!("cache entry valid after probe");
            return Ok(Retrieval {
                response: cached,
                status: CacheStatus::Valid,
                cache_write_error: None,
            });
        }

        debug!("cache entry stale, remote is newer");
        Ok(self.refresh(slug, &path, CacheStatus::Stale).await?)
    }

    /// Fetches a fresh body and replaces the cache entry at `path`.
    ///
    /// The old entry is deleted before the fetch; write failures on either
    /// step are recorded but never fail the retrieval.
    async fn refresh(
        &self,
        slug: &str,
        path: &Path,
        status: CacheStatus,
    ) -> Result<Retrieval, FetchError> {
        let mut cache_write_error = None;

        if let Err(error) = self.store.delete(path).await {
            warn!(%error, "failed to delete superseded cache entry");
            cache_write_error = Some(error);
        }

        let response = into_envelope(self.fetcher.fetch_body(slug).await?);

        if let Err(error) = self.store.put(path, &response).await {
            warn!(%error, "failed to write cache entry");
            cache_write_error = Some(error);
        }

        Ok(Retrieval {
            response,
            status,
            cache_write_error,
        })
    }
}

fn into_envelope(response: RemoteResponse) -> CachedResponse {
    CachedResponse {
        data: response.body,
        headers: response.headers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_status_equality() {
        assert_eq!(CacheStatus::Valid, CacheStatus::Valid);
        assert_ne!(CacheStatus::Valid, CacheStatus::Stale);
    }
}
