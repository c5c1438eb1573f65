//! Remote API access: HTTP fetcher, fetch errors, and retry policy.

mod error;
mod fetcher;
mod retry;

pub use error::FetchError;
pub use fetcher::{RemoteFetcher, RemoteResponse};
pub use retry::{FailureType, RetryDecision, RetryPolicy, classify_error};
