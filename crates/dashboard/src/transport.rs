//! Fetch API transport

use gloo_net::http::Request;
use perf_console_core::{Error, Result, Transport};

#[derive(Debug, Clone)]
pub struct GlooTransport {
    api_url: String,
}

impl GlooTransport {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Transport for GlooTransport {
    async fn get(&self, path: &str, token: Option<&str>) -> Result<String> {
        let url = format!("{}{path}", self.api_url);
        let mut request = Request::get(&url).header("Accept", "application/json");
        if let Some(token) = token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::TransportError(format!("Failed to fetch {url}: {e}")))?;
        if !response.ok() {
            return Err(Error::StatusError {
                status: response.status(),
                path: path.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| Error::TransportError(format!("Failed to read response: {e}")))
    }
}
