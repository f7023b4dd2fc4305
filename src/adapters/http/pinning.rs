//! IPFS Pinning Client - Content Upload via the HTTP API
//!
//! Implements the `PinningService` port against an IPFS-compatible
//! `/api/v0/add` endpoint. Content is sent as the multipart field `file`;
//! the service answers `{ "Name", "Hash", "Size" }` and the content is then
//! served at `{gateway_url}/ipfs/{Hash}`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{info, instrument};

use super::client::HttpClient;
use crate::config::PinningConfig;
use crate::ports::pinning::{PinnedContent, PinningService};

/// Response body of `/api/v0/add`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
  hash: String,
  /// Reported as a decimal string.
  size: String,
}

/// Pinning client for an IPFS HTTP API (e.g. Infura).
pub struct IpfsPinningClient {
  client: HttpClient,
  config: PinningConfig,
}

impl IpfsPinningClient {
  pub const fn new(client: HttpClient, config: PinningConfig) -> Self {
    Self { client, config }
  }

  /// Public URL serving content `hash`.
  pub fn gateway_url(&self, hash: &str) -> String {
    format!("{}/ipfs/{hash}", self.config.gateway_url.trim_end_matches('/'))
  }

  async fn add(&self, part: Part) -> Result<PinnedContent> {
    let url = format!("{}/api/v0/add", self.config.api_url.trim_end_matches('/'));
    let mut request = self
      .client
      .post(&url)
      .multipart(Form::new().part("file", part));

    if let Some(project_id) = &self.config.project_id {
      request = request.basic_auth(project_id, self.config.project_secret.as_ref());
    }

    let added: AddResponse = self.client.send_json(request, "pinning").await?;
    let size = added
      .size
      .parse()
      .with_context(|| format!("Invalid size {:?} in pinning response", added.size))?;

    let pinned = PinnedContent {
      url: self.gateway_url(&added.hash),
      path: added.hash,
      size,
    };
    info!(path = %pinned.path, size = pinned.size, "Content pinned");
    Ok(pinned)
  }
}

#[async_trait]
impl PinningService for IpfsPinningClient {
  #[instrument(skip(self, content), fields(bytes = content.len()))]
  async fn pin_bytes(&self, file_name: &str, content: Vec<u8>) -> Result<PinnedContent> {
    let part = Part::bytes(content).file_name(file_name.to_string());
    self.add(part).await
  }

  #[instrument(skip_all)]
  async fn pin_json(&self, document: &serde_json::Value) -> Result<PinnedContent> {
    let body = serde_json::to_vec(document).context("Failed to serialize document")?;
    let part = Part::bytes(body)
      .file_name("metadata.json")
      .mime_str("application/json")
      .context("Invalid MIME type")?;
    self.add(part).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(gateway_url: &str) -> IpfsPinningClient {
    let http = HttpClient::new(&crate::config::HttpConfig { timeout_seconds: 5 }).unwrap();
    IpfsPinningClient::new(
      http,
      PinningConfig {
        api_url: "http://127.0.0.1:5001".to_string(),
        gateway_url: gateway_url.to_string(),
        project_id: None,
        project_secret: None,
      },
    )
  }

  #[test]
  fn test_gateway_url_joins_without_double_slash() {
    assert_eq!(
      client("https://ipfs.infura.io/").gateway_url("QmHash"),
      "https://ipfs.infura.io/ipfs/QmHash"
    );
  }

  #[test]
  fn test_add_response_decodes() {
    let raw = r#"{"Name":"cat.png","Hash":"QmCat","Size":"1024"}"#;
    let added: AddResponse = serde_json::from_str(raw).unwrap();
    assert_eq!(added.hash, "QmCat");
    assert_eq!(added.size, "1024");
  }
}
