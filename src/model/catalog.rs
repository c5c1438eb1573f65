//! Typed views of the DCAT-US catalog document.

use serde::{Deserialize, Serialize};

/// The top-level catalog document served at `data.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// URI of the DCAT-US schema version this catalog conforms to.
    #[serde(rename = "conformsTo", default)]
    pub conforms_to: Option<String>,
    /// URL of the JSON schema describing this document.
    #[serde(rename = "describedBy", default, skip_serializing_if = "Option::is_none")]
    pub described_by: Option<String>,
    /// Every dataset listed in the catalog.
    pub dataset: Vec<CatalogDataset>,
}

/// One dataset entry in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDataset {
    /// The dataset UUID, extracted from [`CatalogDataset::identifier`] after
    /// deserialization. Empty until the catalog layer fills it in.
    #[serde(default)]
    pub id: String,
    /// Human-readable dataset title.
    pub title: String,
    /// Longer description, often HTML.
    #[serde(default)]
    pub description: String,
    /// Keywords the dataset is tagged with.
    #[serde(default)]
    pub keyword: Vec<String>,
    /// Last-modified date as published in the catalog.
    #[serde(default)]
    pub modified: String,
    /// Canonical dataset URL containing the dataset UUID.
    pub identifier: String,
    /// Publication access level, normally `public`.
    #[serde(rename = "accessLevel", default)]
    pub access_level: String,
    /// Available distributions (API endpoints, file downloads).
    #[serde(default)]
    pub distribution: Vec<Distribution>,
}

/// One way of accessing a dataset's data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distribution {
    /// Distribution format; `"API"` marks a queryable endpoint.
    #[serde(default)]
    pub format: Option<String>,
    /// Endpoint URL for API distributions.
    #[serde(rename = "accessURL", default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    /// Direct file URL for downloadable distributions.
    #[serde(rename = "downloadURL", default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// MIME type of the distribution.
    #[serde(rename = "mediaType", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Distribution title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CatalogDataset {
    /// Returns whether any distribution exposes a queryable API endpoint.
    #[must_use]
    pub fn has_api_distribution(&self) -> bool {
        self.distribution
            .iter()
            .any(|d| d.format.as_deref() == Some("API"))
    }
}
