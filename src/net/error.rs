//! Error types for remote fetch operations.

use thiserror::Error;

/// Errors that can occur while talking to the remote catalog API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS, etc.)
    #[error("network error fetching {slug}: {source}")]
    Network {
        /// The request slug that failed.
        slug: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {slug}")]
    Timeout {
        /// The request slug that timed out.
        slug: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {slug}")]
    HttpStatus {
        /// The request slug that returned an error status.
        slug: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Response body was not the JSON document we expected.
    #[error("invalid JSON body fetching {slug}: {source}")]
    Decode {
        /// The request slug whose body failed to decode.
        slug: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The slug could not be resolved against the configured base URL.
    #[error("invalid request URL: {slug}")]
    InvalidUrl {
        /// The offending slug.
        slug: String,
    },

    /// The request configuration could not produce a usable client.
    #[error("invalid request configuration: {message}")]
    Config {
        /// What part of the configuration was rejected.
        message: String,
    },
}

impl FetchError {
    /// Creates a network error from a transport failure, promoting timeouts
    /// to their own variant.
    pub fn transport(slug: impl Into<String>, source: reqwest::Error) -> Self {
        let slug = slug.into();
        if source.is_timeout() {
            Self::Timeout { slug }
        } else {
            Self::Network { slug, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(slug: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            slug: slug.into(),
            status,
        }
    }

    /// Creates a body decode error.
    pub fn decode(slug: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            slug: slug.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(slug: impl Into<String>) -> Self {
        Self::InvalidUrl { slug: slug.into() }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let error = FetchError::http_status("data.json", 503);
        let msg = error.to_string();
        assert!(msg.contains("503"), "{msg}");
        assert!(msg.contains("data.json"), "{msg}");
    }

    #[test]
    fn test_timeout_display() {
        let error = FetchError::Timeout {
            slug: "data.json".to_string(),
        };
        assert!(error.to_string().contains("timeout"));
    }

    #[test]
    fn test_invalid_url_display() {
        let error = FetchError::invalid_url("ht tp://nope");
        assert!(error.to_string().contains("invalid request URL"));
    }
}
