//! Typed views of the dataset data-viewer responses.
//!
//! The data-viewer endpoint returns rows as arrays of strings plus a `meta`
//! block describing the result window and the dataset's table schema. A
//! size-0 request returns the same shape with no rows, which is how callers
//! cheaply learn `total_rows` and the column schema.

use serde::{Deserialize, Serialize};

/// One data row: column values as strings, ordered per the header list.
pub type DatasetRow = Vec<String>;

/// A data-viewer response: result metadata plus zero or more rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Result window metadata and table schema.
    pub meta: DatasetMeta,
    /// The rows in this window; empty for size-0 probes.
    #[serde(default)]
    pub data: Vec<DatasetRow>,
}

/// Metadata block of a data-viewer response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Total rows in the dataset, independent of the requested window.
    pub total_rows: u64,
    /// Offset of this window into the dataset.
    #[serde(default)]
    pub offset: u64,
    /// Requested window size.
    pub size: u64,
    /// Column names, in row order.
    pub headers: Vec<String>,
    /// Schema details for the underlying data file.
    pub data_file_meta_data: DataFileMeta,
}

/// Data-file metadata wrapper around the table schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataFileMeta {
    /// The table schema, when the dataset publishes one.
    #[serde(rename = "tableSchema", default)]
    pub table_schema: TableSchema,
}

/// A frictionless-style table schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    /// The schema descriptor holding the field list.
    #[serde(default)]
    pub descriptor: SchemaDescriptor,
}

/// Descriptor inside a table schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Per-column field definitions.
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

/// One column definition in a dataset schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    /// Machine column name.
    pub name: String,
    /// Human-readable column title.
    #[serde(default)]
    pub title: String,
    /// Schema type (`string`, `number`, `integer`, `boolean`, ...).
    #[serde(rename = "type", default)]
    pub field_type: String,
    /// Format hint, normally `default`.
    #[serde(default)]
    pub format: String,
}
