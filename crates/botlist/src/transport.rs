//! HTTP transport for the botlist.space API.
//!
//! Every request goes to `{base}/v{version}{path}` and every response is
//! checked the same way: HTTP 429 becomes [`Error::RateLimited`], a payload
//! carrying a non-2xx `code` becomes [`Error::Fetch`]. Nothing is retried.

use crate::error::{Error, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Production API root
pub const DEFAULT_BASE_URL: &str = "https://api.botlist.space";

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("botlist/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportConfig {
    /// Default settings against another API root, e.g. a stub server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Thin wrapper over a `reqwest::Client` bound to one API root
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
}

impl Transport {
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unauthenticated GET
    pub async fn get(&self, path: &str, version: u8, query: &[(&str, String)]) -> Result<Value> {
        let request = self.client.get(self.url(version, path)).query(query);
        self.send(request, route(version, path)).await
    }

    /// GET with the token in the `Authorization` header
    pub async fn auth_get(
        &self,
        path: &str,
        version: u8,
        token: &str,
        query: &[(&str, String)],
    ) -> Result<Value> {
        let request = self
            .client
            .get(self.url(version, path))
            .header(AUTHORIZATION, token)
            .query(query);
        self.send(request, route(version, path)).await
    }

    /// Authenticated POST with a JSON body
    pub async fn post(&self, path: &str, version: u8, token: &str, body: &Value) -> Result<Value> {
        let request = self
            .client
            .post(self.url(version, path))
            .header(AUTHORIZATION, token)
            .json(body);
        self.send(request, route(version, path)).await
    }

    fn url(&self, version: u8, path: &str) -> String {
        format!("{}{}", self.base_url, route(version, path))
    }

    async fn send(&self, request: RequestBuilder, route: String) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            warn!(route = %route, error = %e, "Request error");
            Error::Http(e)
        })?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(route = %route, "Rate limited by server");
            return Err(Error::RateLimited {
                route,
                headers: response.headers().clone(),
            });
        }

        let bytes = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(route = %route, status = %status, error = %e, "Failed to parse response");
            Error::Decode(e)
        })?;

        if let Some(code) = application_code(&payload) {
            if !is_success_code(&code) {
                let message = payload
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string();
                warn!(
                    route = %route,
                    status = %status,
                    code = %code,
                    error = %message,
                    "Request failed"
                );
                return Err(Error::Fetch {
                    status,
                    code,
                    message,
                    body: payload,
                });
            }
        }

        debug!(route = %route, status = %status, "Request successful");
        Ok(payload)
    }
}

fn route(version: u8, path: &str) -> String {
    format!("/v{version}{path}")
}

/// The payload's `code` field, when it carries one worth checking.
///
/// Falsy codes (`0`, `""`, `false`, `null`) are ignored; anything else is
/// checked in its string form, so `true` is checked as `"true"`.
fn application_code(payload: &Value) -> Option<String> {
    match payload.get("code")? {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A code is a success when it contains a `2` followed by two digits anywhere
fn is_success_code(code: &str) -> bool {
    code.as_bytes()
        .windows(3)
        .any(|w| w[0] == b'2' && w[1].is_ascii_digit() && w[2].is_ascii_digit())
}
