//! reqwest transport for the perf API

use crate::error::{Error, Result};
use perf_console_core::Transport;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.bencher.dev";

/// Perf API client
pub struct HttpTransport {
    client: reqwest::Client,
    api_base: Url,
}

impl HttpTransport {
    /// Create a client for `api_url` with a per-request timeout
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("perf-console"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let api_base = Url::parse(api_url)?;
        if api_base.cannot_be_a_base() {
            return Err(Error::ConfigError(format!("Invalid API URL: {api_url}")));
        }

        Ok(Self { client, api_base })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Absolute URL of an API path
    pub fn url(&self, path: &str) -> perf_console_core::Result<Url> {
        Ok(self.api_base.join(path)?)
    }
}

impl Transport for HttpTransport {
    async fn get(&self, path: &str, token: Option<&str>) -> perf_console_core::Result<String> {
        let url = self.url(path)?;
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| perf_console_core::Error::TransportError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(perf_console_core::Error::StatusError {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| perf_console_core::Error::TransportError(e.to_string()))
    }
}
