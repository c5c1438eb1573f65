//! Dataset operations: slug construction and metadata probes.
//!
//! Dataset pages live under `data-api/v1/dataset/{id}/data-viewer` with
//! `size` and `offset` query parameters. A `size=0` request is a cheap
//! probe that returns the metadata block (row count, headers, schema) with
//! no row data.

use thiserror::Error;
use tracing::instrument;

use crate::config::PackageConfig;
use crate::model::{Dataset, DatasetMeta};
use crate::retrieve::{RetrieveError, Retriever};

/// Errors from dataset operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset response could not be retrieved.
    #[error(transparent)]
    Retrieve(#[from] RetrieveError),

    /// The dataset response did not match the expected shape.
    #[error("dataset decode error for {id}: {source}")]
    Decode {
        /// The dataset UUID.
        id: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Builds the data-viewer slug for a dataset, with optional query params.
#[must_use]
pub fn dataset_slug(id: &str, params: &[(&str, String)]) -> String {
    let path = format!("data-api/v1/dataset/{id}/data-viewer");
    if params.is_empty() {
        return path;
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

/// Builds the slug for one dataset page.
#[must_use]
pub fn dataset_page_slug(id: &str, size: u64, offset: u64) -> String {
    dataset_slug(id, &[("size", size.to_string()), ("offset", offset.to_string())])
}

/// Probes a dataset for its metadata via a size-0 request.
///
/// # Errors
///
/// Returns [`DatasetError::Retrieve`] when the probe request fails, or
/// [`DatasetError::Decode`] when the response is not a data-viewer document.
#[instrument(skip(retriever, config))]
pub async fn dataset_meta(
    retriever: &Retriever,
    id: &str,
    config: &PackageConfig,
) -> Result<DatasetMeta, DatasetError> {
    let slug = dataset_slug(id, &[("size", "0".to_string())]);
    let retrieval = retriever.retrieve(&slug, config).await?;
    let dataset: Dataset =
        serde_json::from_value(retrieval.response.data).map_err(|source| DatasetError::Decode {
            id: id.to_string(),
            source,
        })?;
    Ok(dataset.meta)
}
