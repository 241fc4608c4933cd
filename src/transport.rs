// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! HTTP/JSON transport to the detection server

use reqwest::{Client, Response};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{Result, WmError};

pub const INFO_PATH: &str = "/v2/getinfo/json";
pub const LOOKUP_USER_AGENT_PATH: &str = "/v2/lookupuseragent/json";
pub const LOOKUP_DEVICE_ID_PATH: &str = "/v2/lookupdeviceid/json";
pub const LOOKUP_REQUEST_PATH: &str = "/v2/lookuprequest/json";
pub const ALL_DEVICES_PATH: &str = "/v2/alldevices/json";
pub const ALL_OS_VERSIONS_PATH: &str = "/v2/alldeviceosversions/json";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Where the server lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Always ends with ':'
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Without leading or trailing '/'
    pub base_path: String,
}

impl Endpoint {
    /// Normalize the connection parameters.
    ///
    /// An empty scheme becomes `http:` and a missing trailing colon is added.
    /// Other schemes pass through untouched; the transport rejects them when
    /// the first request is attempted. An empty host means `localhost`.
    pub fn new(scheme: &str, host: &str, port: u16, base_path: &str) -> Self {
        let scheme = if scheme.is_empty() {
            "http:".to_string()
        } else if scheme.ends_with(':') {
            scheme.to_string()
        } else {
            format!("{}:", scheme)
        };
        let host = if host.is_empty() {
            "localhost".to_string()
        } else {
            host.to_string()
        };

        Self {
            scheme,
            host,
            port,
            base_path: base_path.trim_matches('/').to_string(),
        }
    }

    /// Absolute URL of an API path
    pub fn url(&self, path: &str) -> String {
        if self.base_path.is_empty() {
            format!("{}//{}:{}{}", self.scheme, self.host, self.port, path)
        } else {
            format!(
                "{}//{}:{}/{}{}",
                self.scheme, self.host, self.port, self.base_path, path
            )
        }
    }
}

/// reqwest-backed JSON transport with a mutable per-request timeout
pub struct HttpTransport {
    client: Client,
    endpoint: Endpoint,
    timeout_ms: AtomicU64,
}

impl HttpTransport {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| WmError::Connection(format!("unable to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            timeout_ms: AtomicU64::new(timeout.as_millis() as u64),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.load(Ordering::Relaxed))
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout_ms
            .store(timeout.as_millis() as u64, Ordering::Relaxed);
    }

    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.endpoint.url(path);
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| connection_error(&url, e))?;
        Self::decode(&url, response).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let url = self.endpoint.url(path);
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout())
            .json(body)
            .send()
            .await
            .map_err(|e| connection_error(&url, e))?;
        Self::decode(&url, response).await
    }

    async fn decode(url: &str, response: Response) -> Result<serde_json::Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WmError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                message: server_message(&body),
            });
        }

        let body = response.text().await.map_err(|e| connection_error(url, e))?;
        serde_json::from_str(&body)
            .map_err(|e| WmError::Protocol(format!("invalid JSON from {}: {}", url, e)))
    }
}

fn connection_error(url: &str, err: reqwest::Error) -> WmError {
    if err.is_timeout() {
        WmError::Connection(format!("request to {} timed out", url))
    } else {
        WmError::Connection(format!("unable to reach {}: {}", url, err))
    }
}

/// Prefer the server's own `error` field over the raw body.
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}
