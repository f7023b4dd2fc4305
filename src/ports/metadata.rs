//! Metadata Port - Off-chain Asset Metadata

use async_trait::async_trait;

use crate::domain::listing::AssetMetadata;

/// Resolves a token URI to its JSON metadata document.
#[async_trait]
pub trait MetadataFetcher: Send + Sync + 'static {
  /// Fetch and decode the document at `token_uri`.
  async fn fetch(&self, token_uri: &str) -> anyhow::Result<AssetMetadata>;
}
