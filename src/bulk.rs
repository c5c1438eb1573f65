//! Bulk page-wise dataset downloads with bounded concurrency.
//!
//! A download starts with a size-0 metadata probe to learn the dataset's
//! total row count, derives the page offsets, then fetches pages under a
//! semaphore capped at `simultaneous_requests` permits. The configured
//! `page_wait` pause runs while the page's permit is still held, so pacing
//! genuinely throttles the request stream rather than just delaying task
//! completion.
//!
//! Page outcomes are settled independently: one failed page never aborts
//! its siblings, and callers get a per-page `Result` for every offset. The
//! order pages *complete* in is unspecified; the returned vector is sorted
//! by offset.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{CatalogError, datasets_by_keyword};
use crate::config::PackageConfig;
use crate::dataset::{DatasetError, dataset_meta, dataset_page_slug};
use crate::model::{CatalogDataset, Dataset};
use crate::retrieve::{RetrieveError, Retriever};

/// Errors that abort a bulk download before any page is fetched.
#[derive(Debug, Error)]
pub enum BulkError {
    /// The initial metadata probe failed, so offsets cannot be derived.
    #[error("dataset metadata probe failed: {0}")]
    Meta(#[from] DatasetError),

    /// The concurrency semaphore was closed while dispatching pages.
    #[error("download semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Errors for one page within a bulk download.
#[derive(Debug, Error)]
pub enum PageError {
    /// The page request failed.
    #[error("page at offset {offset} failed to download: {source}")]
    Retrieve {
        /// Offset of the failed page.
        offset: u64,
        /// The underlying retrieval error.
        #[source]
        source: RetrieveError,
    },

    /// The page response was not a data-viewer document.
    #[error("page at offset {offset} failed to decode: {source}")]
    Decode {
        /// Offset of the undecodable page.
        offset: u64,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The page could not be written to the output directory.
    #[error("failed to persist page to {path}: {source}")]
    Persist {
        /// The output file that could not be written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The page's download task panicked or was cancelled.
    #[error("page task failed: {message}")]
    Task {
        /// Description of the task failure.
        message: String,
    },
}

/// The settled result for one page of a bulk download.
#[derive(Debug)]
pub struct PageOutcome {
    /// The page's row offset.
    pub offset: u64,
    /// Where the page file was written, or why the page failed.
    pub result: Result<PathBuf, PageError>,
}

/// The settled result for one dataset in a keyword download.
#[derive(Debug)]
pub struct DatasetOutcome {
    /// The catalog entry the download targeted.
    pub dataset: CatalogDataset,
    /// The per-page outcomes, or the error that prevented any pages.
    pub pages: Result<Vec<PageOutcome>, BulkError>,
}

/// Derives the page offsets covering `total_rows` rows.
///
/// The final page may be short; zero rows yields no pages. A zero
/// `page_size` is treated as 1.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn page_offsets(total_rows: u64, page_size: u64) -> Vec<u64> {
    (0..total_rows).step_by(page_size.max(1) as usize).collect()
}

/// Returns the output file path for one page: `{output_dir}/{id}/{offset}.json`.
#[must_use]
pub fn page_file_path(output_dir: &Path, id: &str, offset: u64) -> PathBuf {
    output_dir.join(id).join(format!("{offset}.json"))
}

/// Downloads every page of a dataset into `output_dir`.
///
/// Each page file holds the raw row array for its window. Pages are fetched
/// under the configured concurrency cap and every page settles
/// independently; inspect each [`PageOutcome`] for per-page failures.
///
/// # Errors
///
/// Returns [`BulkError::Meta`] when the initial metadata probe fails, or
/// [`BulkError::SemaphoreClosed`] if page dispatch is interrupted.
#[instrument(skip(retriever, config), fields(id = %id))]
pub async fn download_all(
    retriever: &Retriever,
    id: &str,
    output_dir: &Path,
    config: &PackageConfig,
) -> Result<Vec<PageOutcome>, BulkError> {
    let meta = dataset_meta(retriever, id, config).await?;
    let offsets = page_offsets(meta.total_rows, config.network.page_size);
    info!(
        total_rows = meta.total_rows,
        pages = offsets.len(),
        "starting bulk download"
    );

    // Clamp defensively: the field is public, so a zero from a caller who
    // bypassed the config merge must not deadlock the download.
    let semaphore = Arc::new(Semaphore::new(config.network.simultaneous_requests.max(1)));
    let mut handles = Vec::with_capacity(offsets.len());

    for offset in offsets {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| BulkError::SemaphoreClosed)?;
        let retriever = retriever.clone();
        let config = config.clone();
        let page_path = page_file_path(output_dir, id, offset);
        let slug = dataset_page_slug(id, config.network.page_size, offset);

        let handle = tokio::spawn(async move {
            let _permit = permit;
            let result =
                fetch_and_persist_page(&retriever, &slug, &page_path, offset, &config).await;
            // Pace the next request while still holding the permit.
            tokio::time::sleep(config.network.page_wait).await;
            PageOutcome { offset, result }
        });
        handles.push((offset, handle));
    }

    let outcomes = settle_pages(handles).await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(pages = outcomes.len(), failed, "bulk download settled");
    Ok(outcomes)
}

/// Downloads every API-backed dataset tagged with `keyword`.
///
/// Datasets are processed serially; within each dataset, pages still run
/// under the configured concurrency cap. Each dataset settles independently.
///
/// # Errors
///
/// Returns a [`CatalogError`] only when the catalog itself cannot be listed.
#[instrument(skip(retriever, config), fields(keyword = %keyword))]
pub async fn download_by_keyword(
    retriever: &Retriever,
    keyword: &str,
    output_dir: &Path,
    config: &PackageConfig,
) -> Result<Vec<DatasetOutcome>, CatalogError> {
    let datasets = datasets_by_keyword(retriever, keyword, config).await?;
    info!(datasets = datasets.len(), "starting keyword download");

    let mut outcomes = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let pages = download_all(retriever, &dataset.id, output_dir, config).await;
        if let Err(error) = &pages {
            warn!(id = %dataset.id, %error, "dataset download failed");
        }
        outcomes.push(DatasetOutcome { dataset, pages });
    }
    Ok(outcomes)
}

/// Awaits every page task, keeping each outcome tied to its offset.
///
/// A task that panicked or was cancelled settles as a [`PageError::Task`]
/// outcome under its own offset rather than aborting the run.
async fn settle_pages(handles: Vec<(u64, JoinHandle<PageOutcome>)>) -> Vec<PageOutcome> {
    let mut outcomes = Vec::with_capacity(handles.len());
    for (offset, handle) in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(error) => {
                warn!(offset, %error, "page task did not complete");
                outcomes.push(PageOutcome {
                    offset,
                    result: Err(PageError::Task {
                        message: error.to_string(),
                    }),
                });
            }
        }
    }
    outcomes.sort_by_key(|outcome| outcome.offset);
    outcomes
}

async fn fetch_and_persist_page(
    retriever: &Retriever,
    slug: &str,
    page_path: &Path,
    offset: u64,
    config: &PackageConfig,
) -> Result<PathBuf, PageError> {
    let retrieval = retriever
        .retrieve(slug, config)
        .await
        .map_err(|source| PageError::Retrieve { offset, source })?;

    let page: Dataset = serde_json::from_value(retrieval.response.data)
        .map_err(|source| PageError::Decode { offset, source })?;

    let json = serde_json::to_vec(&page.data).map_err(|e| PageError::Persist {
        path: page_path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;

    if let Some(parent) = page_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| PageError::Persist {
                path: page_path.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(page_path, &json)
        .await
        .map_err(|source| PageError::Persist {
            path: page_path.to_path_buf(),
            source,
        })?;

    debug!(offset, path = %page_path.display(), rows = page.data.len(), "page persisted");
    Ok(page_path.to_path_buf())
}
