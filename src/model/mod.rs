//! Typed wire models for catalog and dataset responses.

mod catalog;
mod dataset;

pub use catalog::{Catalog, CatalogDataset, Distribution};
pub use dataset::{
    DataFileMeta, Dataset, DatasetMeta, DatasetRow, SchemaDescriptor, SchemaField, TableSchema,
};
