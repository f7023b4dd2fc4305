//! Asset Registry Port - Token Contract Interface

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::domain::listing::AssetId;

/// Trait for asset registry providers.
#[async_trait]
pub trait AssetRegistryClient: Send + Sync + 'static {
  /// Address of the registry contract.
  fn registry_address(&self) -> Address;

  /// Mint a new asset to the connected account pointing at `token_uri`.
  ///
  /// Returns the sequential id assigned by the registry.
  async fn mint(&self, token_uri: &str) -> anyhow::Result<AssetId>;

  /// Metadata URI stored for `asset_id`.
  async fn token_uri(&self, asset_id: AssetId) -> anyhow::Result<String>;

  /// Current custodian of `asset_id`.
  async fn owner_of(&self, asset_id: AssetId) -> anyhow::Result<Address>;
}
