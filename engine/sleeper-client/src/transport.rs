//! HTTP transport for upstream requests

use crate::error::{Result, UpstreamError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Why a single GET failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The deadline passed before a response arrived
    Timeout,
    /// Network error, non-2xx status, or a body that is not JSON
    Failed(String),
}

/// Performs one GET and decodes the JSON body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str) -> std::result::Result<Value, TransportFailure>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> std::result::Result<Value, TransportFailure> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::Failed(format!("HTTP {}: {}", status, body)));
        }

        response.json::<Value>().await.map_err(classify)
    }
}

fn classify(error: reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout
    } else if error.is_decode() {
        TransportFailure::Failed(format!("Invalid JSON body: {}", error))
    } else {
        TransportFailure::Failed(error.to_string())
    }
}
