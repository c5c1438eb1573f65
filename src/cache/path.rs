//! Cache-key derivation: mapping request slugs to filesystem-safe paths.
//!
//! A slug is the path-plus-query portion of a request
//! (`data-api/v1/dataset/abc/data-viewer?size=0`). The derived key must be
//! deterministic and safe as a single filename on every platform, even when
//! the slug contains path separators, query characters, or non-ASCII text.

use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// File suffix appended to every cache key.
const CACHE_FILE_SUFFIX: &str = ".response.json";

/// Maps a request slug to a filesystem-safe cache key.
///
/// The slug is split on `/`, `.`, `?`, and `&`. Each chunk is folded to
/// plain ASCII (diacritics stripped), lowercased, with every run of
/// characters outside `[a-z0-9]` collapsed to a single `-`. Chunks are
/// rejoined with `_`, so the output alphabet is exactly `[a-z0-9_-]`.
///
/// Total and pure: every input string, including the empty string, yields a
/// valid key, and equal slugs always yield equal keys.
#[must_use]
pub fn sanitize_slug(slug: &str) -> String {
    slug.split(['/', '.', '?', '&'])
        .map(sanitize_chunk)
        .collect::<Vec<_>>()
        .join("_")
}

/// Folds one slug chunk to lowercase `[a-z0-9-]` with collapsed dashes.
fn sanitize_chunk(chunk: &str) -> String {
    let mut out = String::with_capacity(chunk.len());
    let mut prev_dash = false;
    // NFD decomposition splits accented letters into base char + combining
    // mark; the mark is non-alphanumeric and collapses into the dash run.
    for ch in chunk.nfd().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    out
}

/// Returns the on-disk cache file path for a slug under `cache_directory`.
#[must_use]
pub fn cache_file_path(cache_directory: &Path, slug: &str) -> PathBuf {
    cache_directory.join(format!("{}{CACHE_FILE_SUFFIX}", sanitize_slug(slug)))
}
