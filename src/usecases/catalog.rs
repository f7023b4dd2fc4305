//! Catalog Use Case - Listing Pages Assembled from Chain and Metadata
//!
//! Every page follows the same flow:
//! 1. Query the ledger for raw listings
//! 2. For each listing, read its token URI and fetch the metadata document
//! 3. Merge positionally into `MarketItem`s
//!
//! Step 2 runs as concurrent futures joined before returning. The first
//! failure aborts the whole page; there is no partial result.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::future::try_join_all;
use tracing::{error, info, instrument};

use crate::domain::listing::{Listing, MarketItem};
use crate::ports::asset_registry::AssetRegistryClient;
use crate::ports::marketplace::MarketplaceClient;
use crate::ports::metadata::MetadataFetcher;

/// Listings the connected account created, with the sold subset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorDashboard {
  /// Every listing the account created, in ledger order.
  pub created: Vec<MarketItem>,
  /// The subset of `created` that has sold.
  pub sold: Vec<MarketItem>,
}

/// Read-side aggregation over the ledger, the registry and metadata.
pub struct Catalog<M, R, F>
where
  M: MarketplaceClient,
  R: AssetRegistryClient,
  F: MetadataFetcher,
{
  market: Arc<M>,
  registry: Arc<R>,
  metadata: Arc<F>,
}

impl<M, R, F> Catalog<M, R, F>
where
  M: MarketplaceClient,
  R: AssetRegistryClient,
  F: MetadataFetcher,
{
  pub const fn new(market: Arc<M>, registry: Arc<R>, metadata: Arc<F>) -> Self {
    Self {
      market,
      registry,
      metadata,
    }
  }

  /// Unsold listings (home page).
  #[instrument(skip(self))]
  pub async fn market_items(&self) -> Result<Vec<MarketItem>> {
    let listings = self
      .market
      .fetch_unsold_listings()
      .await
      .context("Failed to query unsold listings")?;
    self.enrich(listings).await
  }

  /// Listings owned by the connected account.
  #[instrument(skip(self), fields(account = %self.market.account()))]
  pub async fn my_assets(&self) -> Result<Vec<MarketItem>> {
    let listings = self
      .market
      .fetch_listings_owned_by(self.market.account())
      .await
      .context("Failed to query owned listings")?;
    self.enrich(listings).await
  }

  /// Listings created by the connected account, plus those that sold.
  #[instrument(skip(self), fields(account = %self.market.account()))]
  pub async fn creator_dashboard(&self) -> Result<CreatorDashboard> {
    let listings = self
      .market
      .fetch_listings_created_by(self.market.account())
      .await
      .context("Failed to query created listings")?;
    let created = self.enrich(listings).await?;
    let sold = created.iter().filter(|item| item.sold).cloned().collect();
    Ok(CreatorDashboard { created, sold })
  }

  async fn enrich(&self, listings: Vec<Listing>) -> Result<Vec<MarketItem>> {
    let count = listings.len();
    let items = try_join_all(listings.into_iter().map(|listing| self.load_item(listing)))
      .await
      .inspect_err(|e| error!(error = %e, count, "Failed to load items"))?;

    info!(count, "Items loaded");
    Ok(items)
  }

  /// Token URIs resolve through the connected registry only, so a listing
  /// of any other asset contract fails the page.
  async fn load_item(&self, listing: Listing) -> Result<MarketItem> {
    let registry = self.registry.registry_address();
    anyhow::ensure!(
      listing.asset_contract == registry,
      "Listing {} is for asset contract {}, not the connected registry {registry}",
      listing.id,
      listing.asset_contract
    );

    let token_uri = self
      .registry
      .token_uri(listing.asset_id)
      .await
      .with_context(|| format!("Failed to read token URI of asset {}", listing.asset_id))?;

    let metadata = self
      .metadata
      .fetch(&token_uri)
      .await
      .with_context(|| format!("Failed to fetch metadata from {token_uri}"))?;

    Ok(MarketItem::from_parts(listing, token_uri, metadata))
  }
}
