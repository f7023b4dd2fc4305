//! Marketplace Port - Listing Ledger Interface
//!
//! A connected wallet's view of the marketplace ledger: every call is
//! signed by `account()`. State-changing calls are atomic; a rejection
//! surfaces as a single error with no partial state change.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::domain::listing::{AssetId, Listing, ListingId};

/// Trait for marketplace ledger providers (local chain or EVM RPC).
#[async_trait]
pub trait MarketplaceClient: Send + Sync + 'static {
  /// Address of the connected signer.
  fn account(&self) -> Address;

  /// Address of the ledger contract.
  fn marketplace_address(&self) -> Address;

  /// Fee that must be attached to `create_listing`.
  async fn listing_fee(&self) -> anyhow::Result<U256>;

  /// List `asset_id` of `asset_contract` at `price`, attaching `fee`.
  ///
  /// # Errors
  /// Fails if `price` is zero, `fee` differs from the listing fee, or the
  /// ledger cannot take custody of the asset.
  async fn create_listing(
    &self,
    asset_contract: Address,
    asset_id: AssetId,
    price: U256,
    fee: U256,
  ) -> anyhow::Result<ListingId>;

  /// Buy `listing_id`, attaching `payment`.
  ///
  /// # Errors
  /// Fails if `payment` differs from the price or the listing is sold.
  async fn purchase(
    &self,
    asset_contract: Address,
    asset_id: AssetId,
    listing_id: ListingId,
    payment: U256,
  ) -> anyhow::Result<()>;

  /// All listings not yet sold.
  async fn fetch_unsold_listings(&self) -> anyhow::Result<Vec<Listing>>;

  /// Listings currently owned by `owner`.
  async fn fetch_listings_owned_by(&self, owner: Address) -> anyhow::Result<Vec<Listing>>;

  /// Listings created by `seller`.
  async fn fetch_listings_created_by(&self, seller: Address) -> anyhow::Result<Vec<Listing>>;
}
