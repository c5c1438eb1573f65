//! HTTP fetcher for the remote catalog API.
//!
//! [`RemoteFetcher`] wraps a configured [`reqwest::Client`] and resolves
//! request slugs against the configured base URL. Two request shapes exist:
//! a full body fetch (GET) and a headers-only metadata probe (HEAD) used for
//! cache revalidation. Both run through the configured [`RetryPolicy`].

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::RequestConfig;

use super::error::FetchError;
use super::retry::{RetryDecision, RetryPolicy, classify_error};

/// A remote response: status, lowercase headers, and the decoded JSON body.
///
/// Metadata probes carry `Value::Null` as their body.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, lowercase name to value.
    pub headers: BTreeMap<String, String>,
    /// Decoded JSON body, `Null` for headers-only probes.
    pub body: Value,
}

impl RemoteResponse {
    /// Returns whether the status code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        StatusCode::from_u16(self.status).is_ok_and(|s| s.is_success())
    }
}

/// Issues requests against the configured base URL.
///
/// Cheap to clone; the inner client is reference-counted and shares its
/// connection pool across clones.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl RemoteFetcher {
    /// Builds a fetcher from request configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] when the base URL does not parse, a
    /// configured header is malformed, or the client cannot be built.
    pub fn new(config: &RequestConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::config(format!("base URL {}: {e}", config.base_url)))?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::config(format!("header name {name}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::config(format!("header value for {name}: {e}")))?;
            default_headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| FetchError::config(format!("client build: {e}")))?;

        Ok(Self {
            client,
            base_url,
            retry: config.retry.clone(),
        })
    }

    /// Fetches the full JSON body for `slug` via GET.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the request fails, the server responds
    /// with a non-2xx status, or the body is not valid JSON.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn fetch_body(&self, slug: &str) -> Result<RemoteResponse, FetchError> {
        self.fetch_with_retry(Method::GET, slug).await
    }

    /// Probes `slug` for headers only via HEAD. The returned body is `Null`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the request fails or the server responds
    /// with a non-2xx status.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn fetch_meta(&self, slug: &str) -> Result<RemoteResponse, FetchError> {
        self.fetch_with_retry(Method::HEAD, slug).await
    }

    async fn fetch_with_retry(
        &self,
        method: Method,
        slug: &str,
    ) -> Result<RemoteResponse, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(method.clone(), slug).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    let failure = classify_error(&error);
                    match self.retry.should_retry(failure, attempt) {
                        RetryDecision::Retry { delay, attempt } => {
                            warn!(
                                slug,
                                attempt,
                                delay_ms = delay.as_millis(),
                                %error,
                                "request failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            debug!(slug, attempt, reason, "request failed, not retrying");
                            return Err(error);
                        }
                    }
                }
            }
        }
    }

    async fn fetch_once(&self, method: Method, slug: &str) -> Result<RemoteResponse, FetchError> {
        let url = self
            .base_url
            .join(slug)
            .map_err(|_| FetchError::invalid_url(slug))?;
        let materialize_body = method == Method::GET;

        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(|e| FetchError::transport(slug, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(slug, status.as_u16()));
        }

        let headers = collect_headers(response.headers());
        let body = if materialize_body {
            response.json::<Value>().await.map_err(|e| {
                if e.is_decode() {
                    FetchError::decode(slug, e)
                } else {
                    FetchError::transport(slug, e)
                }
            })?
        } else {
            Value::Null
        };

        Ok(RemoteResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

/// Lowercases header names and drops values that are not valid UTF-8.
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}
