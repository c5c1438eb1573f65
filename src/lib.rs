//! cms-data-sync Core Library
//!
//! Client for the CMS open-data catalog at `https://data.cms.gov`: fetches
//! the DCAT-US catalog and dataset pages, caches responses on local disk,
//! revalidates cached entries against the remote server via cheap metadata
//! probes, and bulk-downloads large datasets page by page under a bounded
//! concurrency limit.
//!
//! # Architecture
//!
//! - [`cache`] - cache-key derivation, disk store, freshness checks
//! - [`net`] - HTTP fetcher, fetch errors, retry policy
//! - [`retrieve`] - the cache-hit/stale/miss decision pipeline
//! - [`catalog`] / [`dataset`] - typed API operations
//! - [`bulk`] - page-wise bulk download with bounded concurrency
//! - [`typegen`] - Rust type declarations from dataset schemas
//! - [`config`] - configuration threaded through every operation
//!
//! # Example
//!
//! ```no_run
//! use cms_data_sync::{PackageConfig, Retriever};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PackageConfig::default();
//! let retriever = Retriever::from_config(&config)?;
//! let catalog = cms_data_sync::catalog::catalog(&retriever, &config).await?;
//! println!("{} datasets", catalog.dataset.len());
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bulk;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod model;
pub mod net;
pub mod retrieve;
pub mod typegen;

// Re-export commonly used types
pub use bulk::{BulkError, DatasetOutcome, PageError, PageOutcome};
pub use cache::{CacheError, CacheStore, CachedResponse};
pub use catalog::CatalogError;
pub use config::{ConfigOverrides, PackageConfig};
pub use dataset::DatasetError;
pub use model::{Catalog, CatalogDataset, Dataset, DatasetMeta};
pub use net::{FetchError, RemoteFetcher, RemoteResponse, RetryPolicy};
pub use retrieve::{CacheStatus, Retrieval, RetrieveError, Retriever};
