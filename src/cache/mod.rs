//! Local response cache: key derivation, disk store, and freshness checks.
//!
//! The cache holds one JSON envelope per request slug under a configured
//! directory. [`path`] turns an arbitrary slug into a filesystem-safe file
//! name, [`store`] owns the on-disk format, and [`freshness`] provides the
//! pure header-comparison decisions used by the retrieval state machine.

pub mod freshness;
mod path;
mod store;

pub use freshness::{header_date, is_expired, is_fresh};
pub use path::{cache_file_path, sanitize_slug};
pub use store::{CacheError, CacheStore, CachedResponse};
