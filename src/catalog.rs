//! Catalog operations: listing datasets and looking them up by id or keyword.
//!
//! The catalog is the DCAT-US document at `data.json`. Dataset entries carry
//! their UUID only inside the `identifier` URL, so deserialization is
//! followed by an id-extraction pass that fills [`CatalogDataset::id`].

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::instrument;

use crate::config::PackageConfig;
use crate::model::{Catalog, CatalogDataset};
use crate::retrieve::{Retrieval, RetrieveError, Retriever};

/// Slug of the catalog document.
pub const CATALOG_SLUG: &str = "data.json";

#[allow(clippy::expect_used)]
static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-f0-9]{8}-([a-f0-9]{4}-){3}[a-f0-9]{12}")
        .expect("UUID pattern is a valid regex")
});

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A dataset identifier did not contain a UUID.
    #[error("invalid identifier: {identifier}")]
    InvalidIdentifier {
        /// The offending identifier.
        identifier: String,
    },

    /// The catalog could not be retrieved.
    #[error(transparent)]
    Retrieve(#[from] RetrieveError),

    /// The catalog document did not match the expected shape.
    #[error("catalog decode error: {source}")]
    Decode {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Returns whether `candidate` is a well-formed dataset UUID.
#[must_use]
pub fn is_dataset_uuid(candidate: &str) -> bool {
    UUID_REGEX.is_match(candidate)
}

/// Extracts the dataset UUID from an identifier URL.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidIdentifier`] when no UUID is present.
pub fn extract_dataset_id(identifier: &str) -> Result<String, CatalogError> {
    UUID_REGEX
        .find(identifier)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| CatalogError::InvalidIdentifier {
            identifier: identifier.to_string(),
        })
}

/// Retrieves the raw catalog response through the cache pipeline.
///
/// # Errors
///
/// Returns a [`RetrieveError`] when the catalog cannot be fetched or an
/// existing cache entry cannot be read.
pub async fn catalog_response(
    retriever: &Retriever,
    config: &PackageConfig,
) -> Result<Retrieval, RetrieveError> {
    retriever.retrieve(CATALOG_SLUG, config).await
}

/// Retrieves the catalog as a typed document with dataset ids filled in.
///
/// # Errors
///
/// Returns a [`CatalogError`] when retrieval fails, the document does not
/// decode, or any dataset identifier lacks a UUID.
#[instrument(skip(retriever, config))]
pub async fn catalog(
    retriever: &Retriever,
    config: &PackageConfig,
) -> Result<Catalog, CatalogError> {
    let retrieval = catalog_response(retriever, config).await?;
    let mut catalog: Catalog = serde_json::from_value(retrieval.response.data)
        .map_err(|source| CatalogError::Decode { source })?;

    for dataset in &mut catalog.dataset {
        dataset.id = extract_dataset_id(&dataset.identifier)?;
    }

    Ok(catalog)
}

/// Looks up a catalog dataset by its UUID.
///
/// The UUID is validated before any network traffic; a malformed id fails
/// fast. Returns `Ok(None)` when the catalog holds no matching dataset.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidIdentifier`] for a malformed `uuid`, or
/// any error from retrieving and decoding the catalog.
pub async fn dataset_by_id(
    retriever: &Retriever,
    uuid: &str,
    config: &PackageConfig,
) -> Result<Option<CatalogDataset>, CatalogError> {
    if !is_dataset_uuid(uuid) {
        return Err(CatalogError::InvalidIdentifier {
            identifier: uuid.to_string(),
        });
    }

    let catalog = catalog(retriever, config).await?;
    Ok(catalog
        .dataset
        .into_iter()
        .find(|dataset| dataset.identifier.contains(uuid)))
}

/// Returns every dataset tagged with `keyword` that exposes an API endpoint.
///
/// # Errors
///
/// Returns any error from retrieving and decoding the catalog.
pub async fn datasets_by_keyword(
    retriever: &Retriever,
    keyword: &str,
    config: &PackageConfig,
) -> Result<Vec<CatalogDataset>, CatalogError> {
    let catalog = catalog(retriever, config).await?;
    Ok(catalog
        .dataset
        .into_iter()
        .filter(|dataset| {
            dataset.keyword.iter().any(|k| k == keyword) && dataset.has_api_distribution()
        })
        .collect())
}
