//! Package configuration: cache, network pacing, and request settings.
//!
//! There is deliberately no process-wide config singleton. Call sites build a
//! [`PackageConfig`] once (usually `PackageConfig::default()`) and pass it to
//! every operation. Per-call adjustments go through [`ConfigOverrides`] and
//! [`PackageConfig::with_overrides`], which never mutates its inputs;
//! [`PackageConfig::apply`] is the in-place counterpart for a config that a
//! caller owns and intends to change.
//!
//! # Example
//!
//! ```
//! use cms_data_sync::config::{ConfigOverrides, NetworkOverrides, PackageConfig};
//!
//! let base = PackageConfig::default();
//! let fast = base.with_overrides(&ConfigOverrides {
//!     network: Some(NetworkOverrides {
//!         simultaneous_requests: Some(4),
//!         ..NetworkOverrides::default()
//!     }),
//!     ..ConfigOverrides::default()
//! });
//! assert_eq!(base.network.simultaneous_requests, 1);
//! assert_eq!(fast.network.simultaneous_requests, 4);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::net::RetryPolicy;

/// Default remote catalog host.
pub const DEFAULT_BASE_URL: &str = "https://data.cms.gov";

/// Default rows per dataset page request.
pub const DEFAULT_PAGE_SIZE: u64 = 5_000;

/// Default pause after each page request.
pub const DEFAULT_PAGE_WAIT: Duration = Duration::from_millis(100);

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large catalog responses).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Top-level configuration threaded through every operation.
#[derive(Debug, Clone)]
pub struct PackageConfig {
    /// Local cache behavior.
    pub cache: CacheConfig,
    /// Page sizing and request pacing.
    pub network: NetworkConfig,
    /// Remote endpoint and transport settings.
    pub request: RequestConfig,
}

/// Local response cache settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Whether responses are cached on disk at all.
    pub enable_local_cache: bool,
    /// Directory holding one `.response.json` file per cache key.
    pub cache_directory: PathBuf,
}

/// Page sizing and pacing for bulk downloads.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Rows requested per dataset page (>= 1).
    pub page_size: u64,
    /// Pause after each page request, pacing load on the remote server.
    pub page_wait: Duration,
    /// Maximum pages in flight at once (>= 1).
    pub simultaneous_requests: usize,
}

/// Remote endpoint and transport settings.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Base URL every slug is resolved against.
    pub base_url: String,
    /// Extra headers attached to every request.
    pub headers: Vec<(String, String)>,
    /// Retry policy for failed requests (default: no retries).
    pub retry: RetryPolicy,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
}

/// Returns the default on-disk cache directory under the process temp dir.
#[must_use]
pub fn default_cache_directory() -> PathBuf {
    std::env::temp_dir().join("cache-cms-data-sync")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable_local_cache: true,
            cache_directory: default_cache_directory(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_wait: DEFAULT_PAGE_WAIT,
            simultaneous_requests: 1,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: Vec::new(),
            retry: RetryPolicy::no_retries(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
        }
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            network: NetworkConfig::default(),
            request: RequestConfig::default(),
        }
    }
}

impl PackageConfig {
    /// Returns a new config with `overrides` merged over `self`.
    ///
    /// Merging is field-wise within each nested section: an override section
    /// only replaces the fields it actually supplies. Neither `self` nor
    /// `overrides` is mutated.
    #[must_use]
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut merged = self.clone();
        merged.apply(overrides.clone());
        merged
    }

    /// Merges `overrides` into `self` in place.
    ///
    /// Nested sections are merged field-wise, never wholesale replaced.
    /// `page_size` and `simultaneous_requests` are clamped to at least 1.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(cache) = overrides.cache {
            if let Some(enable) = cache.enable_local_cache {
                self.cache.enable_local_cache = enable;
            }
            if let Some(dir) = cache.cache_directory {
                self.cache.cache_directory = dir;
            }
        }
        if let Some(network) = overrides.network {
            if let Some(page_size) = network.page_size {
                self.network.page_size = page_size.max(1);
            }
            if let Some(page_wait) = network.page_wait {
                self.network.page_wait = page_wait;
            }
            if let Some(simultaneous) = network.simultaneous_requests {
                self.network.simultaneous_requests = simultaneous.max(1);
            }
        }
        if let Some(request) = overrides.request {
            if let Some(base_url) = request.base_url {
                self.request.base_url = base_url;
            }
            if let Some(headers) = request.headers {
                self.request.headers = headers;
            }
            if let Some(retry) = request.retry {
                self.request.retry = retry;
            }
            if let Some(connect) = request.connect_timeout_secs {
                self.request.connect_timeout_secs = connect;
            }
            if let Some(read) = request.read_timeout_secs {
                self.request.read_timeout_secs = read;
            }
        }
    }
}

/// All-optional mirror of [`PackageConfig`] for per-call adjustments.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Cache section overrides.
    pub cache: Option<CacheOverrides>,
    /// Network section overrides.
    pub network: Option<NetworkOverrides>,
    /// Request section overrides.
    pub request: Option<RequestOverrides>,
}

/// Optional overrides for [`CacheConfig`].
#[derive(Debug, Clone, Default)]
pub struct CacheOverrides {
    /// Overrides [`CacheConfig::enable_local_cache`].
    pub enable_local_cache: Option<bool>,
    /// Overrides [`CacheConfig::cache_directory`].
    pub cache_directory: Option<PathBuf>,
}

/// Optional overrides for [`NetworkConfig`].
#[derive(Debug, Clone, Default)]
pub struct NetworkOverrides {
    /// Overrides [`NetworkConfig::page_size`] (clamped to >= 1).
    pub page_size: Option<u64>,
    /// Overrides [`NetworkConfig::page_wait`].
    pub page_wait: Option<Duration>,
    /// Overrides [`NetworkConfig::simultaneous_requests`] (clamped to >= 1).
    pub simultaneous_requests: Option<usize>,
}

/// Optional overrides for [`RequestConfig`].
#[derive(Debug, Clone, Default)]
pub struct RequestOverrides {
    /// Overrides [`RequestConfig::base_url`].
    pub base_url: Option<String>,
    /// Overrides [`RequestConfig::headers`].
    pub headers: Option<Vec<(String, String)>>,
    /// Overrides [`RequestConfig::retry`].
    pub retry: Option<RetryPolicy>,
    /// Overrides [`RequestConfig::connect_timeout_secs`].
    pub connect_timeout_secs: Option<u64>,
    /// Overrides [`RequestConfig::read_timeout_secs`].
    pub read_timeout_secs: Option<u64>,
}
