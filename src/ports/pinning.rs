//! Pinning Port - Content-addressed Upload
//!
//! Simple contract: POST content, receive the path it is served under.

use async_trait::async_trait;

/// Content pinned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedContent {
  /// Content address (CID) returned by the service.
  pub path: String,
  /// Public gateway URL serving the content.
  pub url: String,
  /// Size reported by the service, in bytes.
  pub size: u64,
}

/// Trait for file-pinning providers.
#[async_trait]
pub trait PinningService: Send + Sync + 'static {
  /// Pin raw bytes (an uploaded file).
  async fn pin_bytes(&self, file_name: &str, content: Vec<u8>) -> anyhow::Result<PinnedContent>;

  /// Pin a JSON document.
  async fn pin_json(&self, document: &serde_json::Value) -> anyhow::Result<PinnedContent>;
}
