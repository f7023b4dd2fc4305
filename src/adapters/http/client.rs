//! HTTP Client - Shared reqwest Wrapper
//!
//! One pooled client with the configured request timeout for every
//! outbound call (metadata documents and the pinning API). No retries:
//! a failed request is reported to the caller as-is.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::HttpConfig;

/// Pooled HTTP client with a fixed request timeout.
#[derive(Clone)]
pub struct HttpClient {
  /// Underlying HTTP client.
  http: Client,
}

impl HttpClient {
  /// Create a new client from `[http]` settings.
  pub fn new(config: &HttpConfig) -> Result<Self> {
    let timeout = Duration::from_secs(config.timeout_seconds);
    let http = Client::builder()
      .timeout(timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self { http })
  }

  /// Start a GET request.
  pub fn get(&self, url: &str) -> RequestBuilder {
    self.http.get(url)
  }

  /// Start a POST request.
  pub fn post(&self, url: &str) -> RequestBuilder {
    self.http.post(url)
  }

  /// Send `request` and decode a JSON body from a successful response.
  pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
    let response = self.send(request, what).await?;
    response
      .json::<T>()
      .await
      .with_context(|| format!("Failed to decode {what} response"))
  }

  /// Send `request`, turning non-success statuses into errors.
  async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
    let response = request
      .send()
      .await
      .with_context(|| format!("{what} request failed"))?;

    let status = response.status();
    if status.is_success() {
      debug!(status = %status, what, "HTTP request succeeded");
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, what, "HTTP request rejected");
    Err(anyhow::anyhow!("{what} returned {status}: {body}"))
  }
}
