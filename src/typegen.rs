//! Rust struct declarations generated from dataset schemas.
//!
//! A dataset's table schema maps onto a plain Rust struct: each schema
//! field becomes a snake_case struct field, with schema types mapped to
//! their closest Rust equivalents. The output is source text; callers
//! decide where to write it.

use thiserror::Error;
use tracing::instrument;

use crate::catalog::{CatalogError, dataset_by_id, datasets_by_keyword};
use crate::config::PackageConfig;
use crate::dataset::{DatasetError, dataset_meta};
use crate::model::{CatalogDataset, SchemaField};
use crate::retrieve::Retriever;

/// Errors from type generation.
#[derive(Debug, Error)]
pub enum TypegenError {
    /// Catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The schema probe failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// The settled result for one dataset in a keyword generation run.
#[derive(Debug)]
pub struct TypegenOutcome {
    /// The catalog entry the declaration was generated for.
    pub dataset: CatalogDataset,
    /// The rendered declaration, or why generation failed.
    pub declaration: Result<String, TypegenError>,
}

/// Derives an UpperCamelCase struct name from a dataset title.
///
/// Non-alphanumeric characters split words. An empty or digit-leading
/// result is prefixed with `Dataset` to stay a legal identifier.
#[must_use]
pub fn struct_name(title: &str) -> String {
    let mut name = String::new();
    for word in title.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.extend(chars.flat_map(char::to_lowercase));
        }
    }
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Dataset{name}")
    } else {
        name
    }
}

/// Converts a schema field name to a snake_case Rust identifier.
fn field_name(name: &str) -> String {
    let mut ident = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                ident.push('_');
            }
            ident.extend(c.to_lowercase());
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !ident.ends_with('_') && !ident.is_empty() {
                ident.push('_');
            }
            prev_lower = false;
        }
    }
    let ident = ident.trim_matches('_').to_string();
    if ident.is_empty() {
        "field".to_string()
    } else {
        ident
    }
}

/// Maps a schema type to its Rust equivalent.
fn rust_type(schema_type: &str) -> &'static str {
    match schema_type {
        "string" => "String",
        "number" => "f64",
        "integer" => "i64",
        "boolean" => "bool",
        _ => "serde_json::Value",
    }
}

/// Renders a struct declaration for `fields`.
#[must_use]
pub fn render_struct(name: &str, fields: &[SchemaField]) -> String {
    let mut out = format!("pub struct {name} {{\n");
    for field in fields {
        if !field.title.is_empty() {
            out.push_str(&format!("    /// {}\n", field.title));
        }
        if !field.field_type.is_empty() && rust_type(&field.field_type) == "serde_json::Value" {
            out.push_str(&format!("    // schema type: {}\n", field.field_type));
        }
        out.push_str(&format!(
            "    pub {}: {},\n",
            field_name(&field.name),
            rust_type(&field.field_type)
        ));
    }
    out.push_str("}\n");
    out
}

/// Generates a struct declaration for the dataset with `id`.
///
/// The struct name comes from `name_override` when given, otherwise from
/// the dataset's catalog title, falling back to a name derived from the id
/// for datasets absent from the catalog.
///
/// # Errors
///
/// Returns a [`TypegenError`] when the schema probe or catalog lookup fails.
#[instrument(skip(retriever, config), fields(id = %id))]
pub async fn generate_by_id(
    retriever: &Retriever,
    id: &str,
    name_override: Option<&str>,
    config: &PackageConfig,
) -> Result<String, TypegenError> {
    let meta = dataset_meta(retriever, id, config).await?;
    let name = match name_override {
        Some(name) => name.to_string(),
        None => match dataset_by_id(retriever, id, config).await? {
            Some(dataset) => struct_name(&dataset.title),
            None => format!("Dataset{}", struct_name(id)),
        },
    };

    Ok(render_struct(
        &name,
        &meta.data_file_meta_data.table_schema.descriptor.fields,
    ))
}

/// Generates declarations for every API-backed dataset tagged with `keyword`.
///
/// Datasets settle independently; a schema probe failure for one dataset is
/// recorded in its [`TypegenOutcome`] without aborting the rest.
///
/// # Errors
///
/// Returns a [`CatalogError`] only when the catalog itself cannot be listed.
pub async fn generate_by_keyword(
    retriever: &Retriever,
    keyword: &str,
    config: &PackageConfig,
) -> Result<Vec<TypegenOutcome>, CatalogError> {
    let datasets = datasets_by_keyword(retriever, keyword, config).await?;

    let mut outcomes = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let declaration = dataset_meta(retriever, &dataset.id, config)
            .await
            .map(|meta| {
                render_struct(
                    &struct_name(&dataset.title),
                    &meta.data_file_meta_data.table_schema.descriptor.fields,
                )
            })
            .map_err(TypegenError::from);
        outcomes.push(TypegenOutcome {
            dataset,
            declaration,
        });
    }
    Ok(outcomes)
}
