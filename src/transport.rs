//! HTTP transport seam between the cache layer and the network.
//!
//! The cached client only ever needs one operation from the network: issue a
//! single GET and map the status line into the error taxonomy. Putting that
//! behind a trait keeps the cache layer testable without sockets.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use crate::error::UpstreamError;

/// One upstream GET returning the parsed JSON body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET to `url` with the given headers.
    ///
    /// Non-success statuses become [`UpstreamError::Status`] with the error
    /// payload carried verbatim.
    async fn get_json(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> std::result::Result<serde_json::Value, UpstreamError>;
}

/// Production transport backed by `reqwest` with a bounded request timeout.
pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    /// Create a transport whose every request times out after `timeout`.
    pub fn new(timeout: Duration) -> std::result::Result<Self, UpstreamError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> std::result::Result<serde_json::Value, UpstreamError> {
        let mut request = self.http.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(UpstreamError::from)?;
        let status = response.status();

        if status.is_success() {
            response.json::<serde_json::Value>().await.map_err(|e| {
                UpstreamError::InvalidResponse(format!("Failed to parse response: {}", e))
            })
        } else {
            // Surface whatever error payload the upstream produced
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);
            Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
