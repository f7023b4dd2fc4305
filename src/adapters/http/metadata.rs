//! Metadata Fetcher - Token URI Resolution over HTTP
//!
//! Implements the `MetadataFetcher` port: `GET {token_uri}` and decode the
//! `{name, description, image}` document. Missing fields decode as empty.

use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;

use super::client::HttpClient;
use crate::domain::listing::AssetMetadata;
use crate::ports::metadata::MetadataFetcher;

/// Fetches asset metadata documents from their token URI.
pub struct HttpMetadataFetcher {
  client: HttpClient,
}

impl HttpMetadataFetcher {
  pub const fn new(client: HttpClient) -> Self {
    Self { client }
  }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
  #[instrument(skip(self))]
  async fn fetch(&self, token_uri: &str) -> Result<AssetMetadata> {
    self
      .client
      .send_json(self.client.get(token_uri), "metadata")
      .await
  }
}
