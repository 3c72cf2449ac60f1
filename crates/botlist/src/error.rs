//! Error types for the botlist.space client.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument had the wrong shape or type
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required value was neither passed nor configured
    #[error("missing value: {0}")]
    MissingValue(String),

    /// The API answered with HTTP 429
    #[error("rate limited on route {route}")]
    RateLimited {
        /// Versioned route that was requested, e.g. `/v1/bots/123`
        route: String,
        /// Response headers, including the rate limit bookkeeping
        headers: HeaderMap,
    },

    /// The payload carried a non-2xx application code
    #[error("fetch failed with code {code}: {message}")]
    Fetch {
        /// HTTP status of the response
        status: StatusCode,
        /// Application code from the payload
        code: String,
        /// The payload's `message`, or a placeholder
        message: String,
        /// Whole decoded payload
        body: Value,
    },

    /// The payload decoded but did not have the expected shape
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON, or an entity could not be mapped
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a rate limit rejection
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    /// How long the server asked us to wait, if it said so.
    ///
    /// Only whole seconds in `Retry-After` are understood.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { headers, .. } => headers
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
            _ => None,
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        let err = Error::RateLimited {
            route: "/v1/bots/1".to_string(),
            headers,
        };

        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_retry_after_missing() {
        let err = Error::RateLimited {
            route: "/v1/statistics".to_string(),
            headers: HeaderMap::new(),
        };
        assert_eq!(err.retry_after(), None);

        let err = Error::MissingValue("id".to_string());
        assert!(!err.is_rate_limited());
        assert_eq!(err.retry_after(), None);
    }
}
